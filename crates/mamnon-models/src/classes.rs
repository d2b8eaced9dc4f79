//! Class domain models and DTOs.
//!
//! A class belongs to exactly one academic year of one school and has a single
//! homeroom teacher. Rows are soft-deleted through `is_destroyed` and never
//! physically removed.

use crate::academic_years::AcademicYearSummary;
use crate::grades::{Grade, Sessions};
use crate::ids::{AcademicYearId, ClassId, SchoolId, UserId};
use crate::users::UserSummary;
use chrono::{DateTime, Utc};
use mamnon_core::serde::deserialize_optional_from_str;
use mamnon_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Class entity as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub id: ClassId,
    /// Generated, human-facing class code (e.g. `LOP-3F9A02BC`)
    pub class_code: String,
    pub school_id: SchoolId,
    pub academic_year_id: AcademicYearId,
    pub grade: Grade,
    pub age_group: String,
    pub name: String,
    pub home_room_teacher: UserId,
    #[sqlx(flatten)]
    pub sessions: Sessions,
    pub description: Option<String>,
    pub created_by: UserId,
    pub is_destroyed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values the store needs to persist a new class.
#[derive(Debug, Clone)]
pub struct NewClass {
    pub class_code: String,
    pub school_id: SchoolId,
    pub academic_year_id: AcademicYearId,
    pub grade: Grade,
    pub age_group: String,
    pub name: String,
    pub home_room_teacher: UserId,
    pub sessions: Sessions,
    pub description: Option<String>,
    pub created_by: UserId,
}

/// A class with its academic year, homeroom teacher and creator expanded.
///
/// References that no longer resolve are rendered as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassView {
    pub id: ClassId,
    pub class_code: String,
    pub school_id: SchoolId,
    pub academic_year_id: AcademicYearId,
    pub academic_year: Option<AcademicYearSummary>,
    pub grade: Grade,
    pub age_group: String,
    pub name: String,
    pub home_room_teacher: Option<UserSummary>,
    pub sessions: Sessions,
    pub description: Option<String>,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassView {
    pub fn expand(
        class: Class,
        academic_year: Option<AcademicYearSummary>,
        home_room_teacher: Option<UserSummary>,
        created_by: Option<UserSummary>,
    ) -> Self {
        Self {
            id: class.id,
            class_code: class.class_code,
            school_id: class.school_id,
            academic_year_id: class.academic_year_id,
            academic_year,
            grade: class.grade,
            age_group: class.age_group,
            name: class.name,
            home_room_teacher,
            sessions: class.sessions,
            description: class.description,
            created_by,
            created_at: class.created_at,
            updated_at: class.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    pub grade: Grade,
    #[validate(length(min = 1, max = 64))]
    pub age_group: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    pub home_room_teacher: UserId,
    #[serde(default)]
    pub sessions: Sessions,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Partial update. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    pub grade: Option<Grade>,
    #[validate(length(min = 1, max = 64))]
    pub age_group: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub home_room_teacher: Option<UserId>,
    pub sessions: Option<Sessions>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ClassFilterParams {
    /// Restrict to one academic year
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub academic_year_id: Option<AcademicYearId>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub grade: Option<Grade>,
    /// Case-insensitive substring of the class name
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<ClassView>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AvailableTeachersQuery {
    pub academic_year_id: AcademicYearId,
    /// Class being edited; its current teacher stays available
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub current_class_id: Option<ClassId>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AgeGroupsQuery {
    pub grade: Grade,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CopyClassesDto {
    pub from_academic_year_id: AcademicYearId,
    pub to_academic_year_id: AcademicYearId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CopyClassesResponse {
    pub count: usize,
    pub classes: Vec<ClassView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("name must not be blank".into());
        return Err(err);
    }
    Ok(())
}
