//! In-process [`SchoolStore`](super::SchoolStore) for tests and local runs.
//!
//! All collections sit behind one `RwLock`, so every mutation (including the
//! uniqueness checks that precede it) is serialised.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mamnon_core::PaginationParams;
use mamnon_models::academic_years::{AcademicYear, NewAcademicYear, YearStatus};
use mamnon_models::classes::{Class, NewClass};
use mamnon_models::departments::Department;
use mamnon_models::ids::{AcademicYearId, ClassId, SchoolId, UserId};
use mamnon_models::users::User;
use tokio::sync::RwLock;

use super::{
    AcademicYearRepository, ClassQuery, ClassRepository, DepartmentRepository, StoreError,
    UniqueConstraint, UserRepository,
};

#[derive(Debug, Default)]
struct Collections {
    academic_years: HashMap<AcademicYearId, AcademicYear>,
    users: HashMap<UserId, User>,
    departments: Vec<Department>,
    classes: HashMap<ClassId, Class>,
    // Insertion counter; breaks created_at ties so ordering is stable.
    sequence: HashMap<ClassId, u64>,
    next_sequence: u64,
}

impl Collections {
    fn live_classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values().filter(|c| !c.is_destroyed)
    }

    fn check_class_unique(&self, class: &Class) -> Result<(), StoreError> {
        for other in self.live_classes().filter(|other| other.id != class.id) {
            if other.academic_year_id != class.academic_year_id {
                continue;
            }
            if other.school_id == class.school_id && other.name == class.name {
                return Err(StoreError::Conflict(UniqueConstraint::ClassName));
            }
            if other.home_room_teacher == class.home_room_teacher {
                return Err(StoreError::Conflict(UniqueConstraint::HomeroomTeacher));
            }
        }
        if self
            .classes
            .values()
            .any(|other| other.id != class.id && other.class_code == class.class_code)
        {
            return Err(StoreError::Conflict(UniqueConstraint::ClassCode));
        }
        Ok(())
    }

    fn sorted_classes<'a>(&self, mut classes: Vec<&'a Class>) -> Vec<&'a Class> {
        classes.sort_by_key(|c| (c.created_at, self.sequence.get(&c.id).copied().unwrap_or(0)));
        classes
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or replaces a user.
    pub async fn put_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }

    /// Seeds or replaces an academic year, bypassing the one-active rule.
    pub async fn put_academic_year(&self, year: AcademicYear) {
        self.inner
            .write()
            .await
            .academic_years
            .insert(year.id, year);
    }

    pub async fn put_department(&self, department: Department) {
        let mut inner = self.inner.write().await;
        inner.departments.retain(|d| d.id != department.id);
        inner.departments.push(department);
    }

    pub async fn user(&self, id: UserId) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    pub async fn academic_year(&self, id: AcademicYearId) -> Option<AcademicYear> {
        self.inner.read().await.academic_years.get(&id).cloned()
    }

    /// Any class row, including soft-deleted ones.
    pub async fn class(&self, id: ClassId) -> Option<Class> {
        self.inner.read().await.classes.get(&id).cloned()
    }

    /// Every class row, including soft-deleted ones, in insertion order.
    pub async fn all_classes(&self) -> Vec<Class> {
        let inner = self.inner.read().await;
        let mut rows: Vec<&Class> = inner.classes.values().collect();
        rows.sort_by_key(|c| inner.sequence.get(&c.id).copied().unwrap_or(0));
        rows.into_iter().cloned().collect()
    }
}

#[async_trait]
impl AcademicYearRepository for MemoryStore {
    async fn find_active_year(
        &self,
        school_id: SchoolId,
    ) -> Result<Option<AcademicYear>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .academic_years
            .values()
            .find(|y| y.school_id == school_id && y.is_active())
            .cloned())
    }

    async fn find_academic_year(
        &self,
        school_id: SchoolId,
        id: AcademicYearId,
    ) -> Result<Option<AcademicYear>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .academic_years
            .get(&id)
            .filter(|y| y.school_id == school_id)
            .cloned())
    }

    async fn mark_year_configured(&self, id: AcademicYearId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(year) = inner.academic_years.get_mut(&id) {
            if !year.is_config {
                year.is_config = true;
                year.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn insert_academic_year(
        &self,
        year: NewAcademicYear,
    ) -> Result<AcademicYear, StoreError> {
        let mut inner = self.inner.write().await;
        let exists = inner.academic_years.values().any(|y| {
            y.school_id == year.school_id && y.from_year == year.from_year && y.to_year == year.to_year
        });
        if exists {
            return Err(StoreError::Conflict(UniqueConstraint::AcademicYearRange));
        }

        let now = Utc::now();
        let row = AcademicYear {
            id: AcademicYearId::new(),
            school_id: year.school_id,
            from_year: year.from_year,
            to_year: year.to_year,
            status: YearStatus::Inactive,
            is_config: false,
            created_at: now,
            updated_at: now,
        };
        inner.academic_years.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_academic_years(
        &self,
        school_id: SchoolId,
        pagination: &PaginationParams,
    ) -> Result<(Vec<AcademicYear>, i64), StoreError> {
        let inner = self.inner.read().await;
        let mut years: Vec<AcademicYear> = inner
            .academic_years
            .values()
            .filter(|y| y.school_id == school_id)
            .cloned()
            .collect();
        years.sort_by(|a, b| {
            b.from_year
                .cmp(&a.from_year)
                .then(b.created_at.cmp(&a.created_at))
        });

        let total = years.len() as i64;
        Ok((pagination.apply(years), total))
    }

    async fn activate_academic_year(
        &self,
        school_id: SchoolId,
        id: AcademicYearId,
    ) -> Result<AcademicYear, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner
            .academic_years
            .get(&id)
            .is_some_and(|y| y.school_id == school_id)
        {
            return Err(StoreError::Missing("Academic year"));
        }

        let now = Utc::now();
        for year in inner
            .academic_years
            .values_mut()
            .filter(|y| y.school_id == school_id)
        {
            let status = if year.id == id {
                YearStatus::Active
            } else {
                YearStatus::Inactive
            };
            if year.status != status {
                year.status = status;
                year.updated_at = now;
            }
        }

        inner
            .academic_years
            .get(&id)
            .cloned()
            .ok_or(StoreError::Missing("Academic year"))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).filter(|u| !u.is_destroyed).cloned())
    }

    async fn find_teacher(
        &self,
        school_id: SchoolId,
        id: UserId,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .get(&id)
            .filter(|u| u.is_assignable_teacher(school_id))
            .cloned())
    }

    async fn list_active_teachers(&self, school_id: SchoolId) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut teachers: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.is_assignable_teacher(school_id))
            .cloned()
            .collect();
        teachers.sort_by_key(|u| (u.created_at, u.id));
        Ok(teachers)
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn set_homeroom_class(
        &self,
        teacher_id: UserId,
        class_id: Option<ClassId>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&teacher_id) {
            user.class_id = class_id;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn reassign_homeroom(
        &self,
        class_id: ClassId,
        from: UserId,
        to: UserId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        if let Some(previous) = inner.users.get_mut(&from) {
            if previous.class_id == Some(class_id) {
                previous.class_id = None;
                previous.updated_at = now;
            }
        }
        if let Some(next) = inner.users.get_mut(&to) {
            next.class_id = Some(class_id);
            next.updated_at = now;
        }
        Ok(())
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn find_department(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
        name: &str,
    ) -> Result<Option<Department>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .departments
            .iter()
            .find(|d| {
                d.school_id == school_id && d.academic_year_id == academic_year_id && d.name == name
            })
            .cloned())
    }
}

#[async_trait]
impl ClassRepository for MemoryStore {
    async fn find_class(
        &self,
        school_id: SchoolId,
        id: ClassId,
    ) -> Result<Option<Class>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .classes
            .get(&id)
            .filter(|c| c.school_id == school_id && !c.is_destroyed)
            .cloned())
    }

    async fn find_class_by_name(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
        name: &str,
        exclude: Option<ClassId>,
    ) -> Result<Option<Class>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .live_classes()
            .find(|c| {
                c.school_id == school_id
                    && c.academic_year_id == academic_year_id
                    && c.name == name
                    && Some(c.id) != exclude
            })
            .cloned())
    }

    async fn find_class_by_teacher(
        &self,
        academic_year_id: AcademicYearId,
        teacher_id: UserId,
        exclude: Option<ClassId>,
    ) -> Result<Option<Class>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .live_classes()
            .find(|c| {
                c.academic_year_id == academic_year_id
                    && c.home_room_teacher == teacher_id
                    && Some(c.id) != exclude
            })
            .cloned())
    }

    async fn list_classes_in_year(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
    ) -> Result<Vec<Class>, StoreError> {
        let inner = self.inner.read().await;
        let classes = inner
            .live_classes()
            .filter(|c| c.school_id == school_id && c.academic_year_id == academic_year_id)
            .collect();
        Ok(inner
            .sorted_classes(classes)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn count_classes_in_year(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
    ) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .live_classes()
            .filter(|c| c.school_id == school_id && c.academic_year_id == academic_year_id)
            .count() as i64)
    }

    async fn insert_class(&self, class: NewClass) -> Result<Class, StoreError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let row = Class {
            id: ClassId::new(),
            class_code: class.class_code,
            school_id: class.school_id,
            academic_year_id: class.academic_year_id,
            grade: class.grade,
            age_group: class.age_group,
            name: class.name,
            home_room_teacher: class.home_room_teacher,
            sessions: class.sessions,
            description: class.description,
            created_by: class.created_by,
            is_destroyed: false,
            created_at: now,
            updated_at: now,
        };
        inner.check_class_unique(&row)?;

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.sequence.insert(row.id, sequence);
        inner.classes.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_class(&self, class: &Class) -> Result<Class, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.classes.get(&class.id).is_some_and(|c| !c.is_destroyed) {
            return Err(StoreError::Missing("Class"));
        }
        inner.check_class_unique(class)?;

        let row = inner
            .classes
            .get_mut(&class.id)
            .ok_or(StoreError::Missing("Class"))?;
        row.grade = class.grade;
        row.age_group = class.age_group.clone();
        row.name = class.name.clone();
        row.home_room_teacher = class.home_room_teacher;
        row.sessions = class.sessions;
        row.description = class.description.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn soft_delete_class(&self, id: ClassId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(class) = inner.classes.get_mut(&id) {
            class.is_destroyed = true;
            class.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn search_classes(&self, query: &ClassQuery) -> Result<(Vec<Class>, i64), StoreError> {
        let inner = self.inner.read().await;
        let matches = inner.classes.values().filter(|c| query.matches(c)).collect();
        let mut classes: Vec<Class> = inner
            .sorted_classes(matches)
            .into_iter()
            .cloned()
            .collect();
        classes.reverse();

        let total = classes.len() as i64;
        Ok((query.pagination.apply(classes), total))
    }
}
