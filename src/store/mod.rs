//! Data-access seam between the services and persistence.
//!
//! Each collection the class rules touch gets its own repository trait.
//! [`SchoolStore`] bundles them so a service can hold a single
//! `Arc<dyn SchoolStore>`, backed either by PostgreSQL ([`PgStore`]) or by
//! process memory ([`MemoryStore`]).
//!
//! Both backends enforce the same uniqueness rules the schema declares:
//! one live class per (school, year, name), one live class per
//! (year, homeroom teacher), one active year per school. A violation is
//! reported as [`StoreError::Conflict`] so that concurrent requests which
//! both passed the service pre-flight checks still cannot double-book.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::fmt;

use anyhow::anyhow;
use async_trait::async_trait;
use mamnon_core::{AppError, PaginationParams};
use mamnon_models::academic_years::{AcademicYear, NewAcademicYear};
use mamnon_models::classes::{Class, NewClass};
use mamnon_models::departments::Department;
use mamnon_models::grades::Grade;
use mamnon_models::ids::{AcademicYearId, ClassId, SchoolId, UserId};
use mamnon_models::users::User;
use uuid::Uuid;

/// Uniqueness rules enforced by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    ClassName,
    HomeroomTeacher,
    ClassCode,
    AcademicYearRange,
    ActiveAcademicYear,
}

impl fmt::Display for UniqueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::ClassName => "A class with this name already exists in this academic year",
            Self::HomeroomTeacher => {
                "Teacher is already homeroom teacher of another class in this academic year"
            }
            Self::ClassCode => "Generated class code is already in use",
            Self::AcademicYearRange => "This academic year already exists for the school",
            Self::ActiveAcademicYear => "The school already has an active academic year",
        };
        f.write_str(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(UniqueConstraint),

    #[error("{0} not found")]
    Missing(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => AppError::conflict(anyhow!("{}", constraint)),
            StoreError::Missing(entity) => AppError::not_found(anyhow!("{} not found", entity)),
            StoreError::Database(err) => AppError::internal(err),
        }
    }
}

/// Filtered, paginated class search.
#[derive(Debug, Clone, Default)]
pub struct ClassQuery {
    pub school_id: SchoolId,
    pub academic_year_id: Option<AcademicYearId>,
    pub grade: Option<Grade>,
    /// Case-insensitive substring of the class name
    pub name: Option<String>,
    pub pagination: PaginationParams,
}

impl ClassQuery {
    pub fn matches(&self, class: &Class) -> bool {
        if class.is_destroyed || class.school_id != self.school_id {
            return false;
        }
        if self.academic_year_id.is_some_and(|year| year != class.academic_year_id) {
            return false;
        }
        if self.grade.is_some_and(|grade| grade != class.grade) {
            return false;
        }
        match self.name_pattern() {
            Some(pattern) => class.name.to_lowercase().contains(&pattern),
            None => true,
        }
    }

    /// Lower-cased search term, `None` when absent or blank.
    pub fn name_pattern(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// [`Self::name_pattern`] as a `LIKE` operand (with `ESCAPE` backslash) that
    /// matches it as a literal substring.
    pub fn name_like_pattern(&self) -> Option<String> {
        self.name_pattern().map(|pattern| {
            let mut escaped = String::with_capacity(pattern.len() + 2);
            escaped.push('%');
            for c in pattern.chars() {
                if matches!(c, '\\' | '%' | '_') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            escaped.push('%');
            escaped
        })
    }
}

#[async_trait]
pub trait AcademicYearRepository: Send + Sync {
    /// The single year of `school_id` whose status is `active`.
    async fn find_active_year(&self, school_id: SchoolId)
    -> Result<Option<AcademicYear>, StoreError>;

    async fn find_academic_year(
        &self,
        school_id: SchoolId,
        id: AcademicYearId,
    ) -> Result<Option<AcademicYear>, StoreError>;

    /// Sets `is_config`. Never clears it.
    async fn mark_year_configured(&self, id: AcademicYearId) -> Result<(), StoreError>;

    async fn insert_academic_year(&self, year: NewAcademicYear)
    -> Result<AcademicYear, StoreError>;

    /// Newest first, with the total count.
    async fn list_academic_years(
        &self,
        school_id: SchoolId,
        pagination: &PaginationParams,
    ) -> Result<(Vec<AcademicYear>, i64), StoreError>;

    /// Makes `id` the only active year of its school in one unit of work.
    async fn activate_academic_year(
        &self,
        school_id: SchoolId,
        id: AcademicYearId,
    ) -> Result<AcademicYear, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// An active, non-deleted user with the teacher role in `school_id`.
    async fn find_teacher(
        &self,
        school_id: SchoolId,
        id: UserId,
    ) -> Result<Option<User>, StoreError>;

    /// Active, non-deleted teachers of `school_id`, oldest account first.
    async fn list_active_teachers(&self, school_id: SchoolId) -> Result<Vec<User>, StoreError>;

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    async fn set_homeroom_class(
        &self,
        teacher_id: UserId,
        class_id: Option<ClassId>,
    ) -> Result<(), StoreError>;

    /// Clears the back-reference on `from` and sets it on `to` atomically.
    async fn reassign_homeroom(
        &self,
        class_id: ClassId,
        from: UserId,
        to: UserId,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find_department(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
        name: &str,
    ) -> Result<Option<Department>, StoreError>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// A live class of `school_id`.
    async fn find_class(&self, school_id: SchoolId, id: ClassId)
    -> Result<Option<Class>, StoreError>;

    async fn find_class_by_name(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
        name: &str,
        exclude: Option<ClassId>,
    ) -> Result<Option<Class>, StoreError>;

    async fn find_class_by_teacher(
        &self,
        academic_year_id: AcademicYearId,
        teacher_id: UserId,
        exclude: Option<ClassId>,
    ) -> Result<Option<Class>, StoreError>;

    /// Live classes of a year in creation order.
    async fn list_classes_in_year(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
    ) -> Result<Vec<Class>, StoreError>;

    async fn count_classes_in_year(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
    ) -> Result<i64, StoreError>;

    async fn insert_class(&self, class: NewClass) -> Result<Class, StoreError>;

    /// Persists every mutable field of `class`.
    async fn update_class(&self, class: &Class) -> Result<Class, StoreError>;

    async fn soft_delete_class(&self, id: ClassId) -> Result<(), StoreError>;

    /// Newest first, with the total count of matches.
    async fn search_classes(&self, query: &ClassQuery) -> Result<(Vec<Class>, i64), StoreError>;
}

/// Everything the class and academic-year services need from persistence.
pub trait SchoolStore:
    AcademicYearRepository + UserRepository + DepartmentRepository + ClassRepository
{
}

impl<T> SchoolStore for T where
    T: AcademicYearRepository + UserRepository + DepartmentRepository + ClassRepository
{
}

/// Source of unique, human-facing class codes.
pub trait ClassCodeGenerator: Send + Sync {
    fn next_code(&self) -> String;
}

/// Generates `<PREFIX>-XXXXXXXX` from the first 8 hex digits of a v4 UUID.
#[derive(Debug, Clone)]
pub struct PrefixedCodeGenerator {
    prefix: String,
}

impl PrefixedCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl ClassCodeGenerator for PrefixedCodeGenerator {
    fn next_code(&self) -> String {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("{}-{}", self.prefix, &hex[..8])
    }
}
