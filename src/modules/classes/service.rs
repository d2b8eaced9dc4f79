use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use mamnon_config::AssignmentPolicy;
use mamnon_core::PaginationMeta;
use mamnon_models::academic_years::AcademicYearSummary;
use mamnon_models::classes::{
    AvailableTeachersQuery, Class, ClassFilterParams, ClassView, CopyClassesDto,
    CopyClassesResponse, CreateClassDto, MessageResponse, NewClass, PaginatedClassesResponse,
    UpdateClassDto,
};
use mamnon_models::grades::{AgeGroupsResponse, Grade};
use mamnon_models::ids::{AcademicYearId, ClassId, SchoolId, UserId};
use mamnon_models::users::{User, UserSummary};
use tracing::{error, info, instrument, warn};

use super::availability::{assigned_teachers, available_teachers, plan_copy};
use super::error::ClassError;
use crate::modules::school_scope::school_of;
use crate::store::{ClassCodeGenerator, ClassQuery, SchoolStore};

fn check_age_group(grade: Grade, age_group: &str) -> Result<(), ClassError> {
    if grade.accepts_age_group(age_group) {
        Ok(())
    } else {
        Err(ClassError::InvalidAgeGroup {
            grade,
            age_group: age_group.to_string(),
        })
    }
}

/// Class assignment rules over a [`SchoolStore`].
///
/// Every operation resolves the caller's school first and only ever touches
/// rows of that school.
#[derive(Clone)]
pub struct ClassService {
    store: Arc<dyn SchoolStore>,
    codes: Arc<dyn ClassCodeGenerator>,
    policy: AssignmentPolicy,
}

impl fmt::Debug for ClassService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ClassService {
    pub fn new(
        store: Arc<dyn SchoolStore>,
        codes: Arc<dyn ClassCodeGenerator>,
        policy: AssignmentPolicy,
    ) -> Self {
        Self {
            store,
            codes,
            policy,
        }
    }

    pub fn age_groups(grade: Grade) -> AgeGroupsResponse {
        AgeGroupsResponse::from(grade)
    }

    #[instrument(skip(self))]
    pub async fn create_class(
        &self,
        caller: UserId,
        dto: CreateClassDto,
    ) -> Result<ClassView, ClassError> {
        let school_id = school_of(&*self.store, caller).await?;
        let year = self
            .store
            .find_active_year(school_id)
            .await?
            .ok_or(ClassError::NoActiveYear)?;

        let name = dto.name.trim().to_string();
        if self
            .store
            .find_class_by_name(school_id, year.id, &name, None)
            .await?
            .is_some()
        {
            return Err(ClassError::DuplicateName(name));
        }

        let age_group = dto.age_group.trim().to_string();
        check_age_group(dto.grade, &age_group)?;

        if !dto.sessions.any_selected() {
            return Err(ClassError::NoSessionSelected);
        }

        let teacher = self
            .check_teacher(school_id, year.id, dto.home_room_teacher, None)
            .await?;

        let class = self
            .store
            .insert_class(NewClass {
                class_code: self.codes.next_code(),
                school_id,
                academic_year_id: year.id,
                grade: dto.grade,
                age_group,
                name,
                home_room_teacher: teacher.id,
                sessions: dto.sessions,
                description: dto.description,
                created_by: caller,
            })
            .await?;

        self.store
            .set_homeroom_class(teacher.id, Some(class.id))
            .await?;

        if !year.is_config {
            self.store.mark_year_configured(year.id).await?;
        }

        info!(
            class_id = %class.id,
            class_code = %class.class_code,
            academic_year_id = %year.id,
            "Class created"
        );

        self.expand(class).await
    }

    #[instrument(skip(self))]
    pub async fn update_class(
        &self,
        caller: UserId,
        class_id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<ClassView, ClassError> {
        let school_id = school_of(&*self.store, caller).await?;
        let mut class = self
            .store
            .find_class(school_id, class_id)
            .await?
            .ok_or(ClassError::ClassNotFound)?;
        self.require_active_year(school_id, class.academic_year_id)
            .await?;

        if let Some(name) = dto.name.map(|name| name.trim().to_string()) {
            if name != class.name
                && self
                    .store
                    .find_class_by_name(school_id, class.academic_year_id, &name, Some(class.id))
                    .await?
                    .is_some()
            {
                return Err(ClassError::DuplicateName(name));
            }
            class.name = name;
        }

        if dto.grade.is_some() || dto.age_group.is_some() {
            let grade = dto.grade.unwrap_or(class.grade);
            let age_group = dto
                .age_group
                .map(|g| g.trim().to_string())
                .unwrap_or_else(|| class.age_group.clone());
            check_age_group(grade, &age_group)?;
            class.grade = grade;
            class.age_group = age_group;
        }

        if let Some(sessions) = dto.sessions {
            if !sessions.any_selected() {
                return Err(ClassError::NoSessionSelected);
            }
            class.sessions = sessions;
        }

        if let Some(description) = dto.description {
            class.description = Some(description);
        }

        let previous_teacher = class.home_room_teacher;
        let new_teacher = dto
            .home_room_teacher
            .filter(|teacher| *teacher != previous_teacher);
        if let Some(teacher) = new_teacher {
            self.check_teacher(school_id, class.academic_year_id, teacher, Some(class.id))
                .await?;
            class.home_room_teacher = teacher;
        }

        let updated = self.store.update_class(&class).await?;

        if let Some(teacher) = new_teacher {
            self.store
                .reassign_homeroom(updated.id, previous_teacher, teacher)
                .await?;
        }

        info!(class_id = %updated.id, "Class updated");
        self.expand(updated).await
    }

    #[instrument(skip(self))]
    pub async fn delete_class(
        &self,
        caller: UserId,
        class_id: ClassId,
    ) -> Result<MessageResponse, ClassError> {
        let school_id = school_of(&*self.store, caller).await?;
        let class = self
            .store
            .find_class(school_id, class_id)
            .await?
            .ok_or(ClassError::ClassNotFound)?;
        self.require_active_year(school_id, class.academic_year_id)
            .await?;

        let holds_back_reference = self
            .store
            .find_user(class.home_room_teacher)
            .await?
            .is_some_and(|teacher| teacher.class_id == Some(class.id));
        if holds_back_reference {
            self.store
                .set_homeroom_class(class.home_room_teacher, None)
                .await?;
        }

        self.store.soft_delete_class(class.id).await?;

        info!(class_id = %class.id, "Class deleted");
        Ok(MessageResponse::new("Class deleted successfully"))
    }

    #[instrument(skip(self))]
    pub async fn list_classes(
        &self,
        caller: UserId,
        filters: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, ClassError> {
        let school_id = school_of(&*self.store, caller).await?;
        let query = ClassQuery {
            school_id,
            academic_year_id: filters.academic_year_id,
            grade: filters.grade,
            name: filters.name,
            pagination: filters.pagination,
        };

        let (classes, total) = self.store.search_classes(&query).await?;
        let data = self.expand_all(classes).await?;

        Ok(PaginatedClassesResponse {
            data,
            meta: PaginationMeta::new(&query.pagination, total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_class(&self, caller: UserId, class_id: ClassId) -> Result<ClassView, ClassError> {
        let school_id = school_of(&*self.store, caller).await?;
        let class = self
            .store
            .find_class(school_id, class_id)
            .await?
            .ok_or(ClassError::ClassNotFound)?;

        self.expand(class).await
    }

    /// Teachers that may still become homeroom teacher in the given year.
    #[instrument(skip(self))]
    pub async fn available_teachers(
        &self,
        caller: UserId,
        query: AvailableTeachersQuery,
    ) -> Result<Vec<UserSummary>, ClassError> {
        let school_id = school_of(&*self.store, caller).await?;

        let teachers = self.store.list_active_teachers(school_id).await?;
        let excluded = self
            .excluded_managers(school_id, query.academic_year_id)
            .await?;
        let classes = self
            .store
            .list_classes_in_year(school_id, query.academic_year_id)
            .await?;
        let assigned = assigned_teachers(&classes, query.current_class_id);

        Ok(available_teachers(teachers, &excluded, &assigned)
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }

    /// Bootstraps an empty, active year with the classes of another year.
    ///
    /// Rows are copied one by one: a class that cannot get a teacher, or
    /// whose insert fails, is logged and skipped. Copying nothing at all is
    /// an error.
    #[instrument(skip(self))]
    pub async fn copy_classes(
        &self,
        caller: UserId,
        dto: CopyClassesDto,
    ) -> Result<CopyClassesResponse, ClassError> {
        let school_id = school_of(&*self.store, caller).await?;
        let source_year = self
            .store
            .find_academic_year(school_id, dto.from_academic_year_id)
            .await?
            .ok_or(ClassError::AcademicYearNotFound)?;
        let target_year = self
            .store
            .find_academic_year(school_id, dto.to_academic_year_id)
            .await?
            .ok_or(ClassError::AcademicYearNotFound)?;

        if !target_year.is_active() {
            return Err(ClassError::YearNotActive);
        }
        if self
            .store
            .count_classes_in_year(school_id, target_year.id)
            .await?
            > 0
        {
            return Err(ClassError::DestinationNotEmpty);
        }

        let source = self
            .store
            .list_classes_in_year(school_id, source_year.id)
            .await?;
        if source.is_empty() {
            return Err(ClassError::SourceEmpty);
        }

        let excluded = self.excluded_managers(school_id, target_year.id).await?;
        let eligible: Vec<UserId> = self
            .store
            .list_active_teachers(school_id)
            .await?
            .into_iter()
            .map(|teacher| teacher.id)
            .filter(|id| !excluded.contains(id))
            .collect();

        let plan = plan_copy(&source, &eligible);
        for class in &plan.skipped {
            warn!(
                source_class_id = %class.id,
                name = %class.name,
                "No eligible teacher left in destination year; skipping class"
            );
        }

        let mut created = Vec::with_capacity(plan.assignments.len());
        let mut failed = 0usize;
        for (class, teacher) in plan.assignments {
            let inserted = self
                .store
                .insert_class(NewClass {
                    class_code: self.codes.next_code(),
                    school_id,
                    academic_year_id: target_year.id,
                    grade: class.grade,
                    age_group: class.age_group.clone(),
                    name: class.name.clone(),
                    home_room_teacher: teacher,
                    sessions: class.sessions,
                    description: class.description.clone(),
                    created_by: caller,
                })
                .await;

            let row = match inserted {
                Ok(row) => row,
                Err(err) => {
                    error!(source_class_id = %class.id, error = %err, "Failed to copy class; skipping");
                    failed += 1;
                    continue;
                }
            };

            // A copied class must be linked from its teacher; otherwise drop it.
            if let Err(err) = self.store.set_homeroom_class(teacher, Some(row.id)).await {
                error!(class_id = %row.id, teacher_id = %teacher, error = %err, "Failed to set homeroom back-reference; discarding copied class");
                if let Err(err) = self.store.soft_delete_class(row.id).await {
                    error!(class_id = %row.id, error = %err, "Failed to discard copied class");
                }
                failed += 1;
                continue;
            }
            created.push(row);
        }

        if created.is_empty() {
            return Err(ClassError::NoEligibleTeachers);
        }

        if !target_year.is_config {
            self.store.mark_year_configured(target_year.id).await?;
        }

        info!(
            from = %source_year.label(),
            to = %target_year.label(),
            copied = created.len(),
            skipped = plan.skipped.len() + failed,
            "Classes copied"
        );

        let classes = self.expand_all(created).await?;
        Ok(CopyClassesResponse {
            count: classes.len(),
            classes,
        })
    }

    async fn require_active_year(
        &self,
        school_id: SchoolId,
        year_id: AcademicYearId,
    ) -> Result<(), ClassError> {
        let year = self
            .store
            .find_academic_year(school_id, year_id)
            .await?
            .ok_or(ClassError::AcademicYearNotFound)?;
        if !year.is_active() {
            return Err(ClassError::YearNotActive);
        }
        Ok(())
    }

    /// Managers of the excluded department in `year_id`; empty when it does not exist.
    async fn excluded_managers(
        &self,
        school_id: SchoolId,
        year_id: AcademicYearId,
    ) -> Result<HashSet<UserId>, ClassError> {
        let department = self
            .store
            .find_department(school_id, year_id, &self.policy.exclusion_department)
            .await?;
        Ok(department
            .map(|d| d.manager_ids.into_iter().collect())
            .unwrap_or_default())
    }

    /// Checks that `teacher_id` can be homeroom teacher in `year_id`.
    async fn check_teacher(
        &self,
        school_id: SchoolId,
        year_id: AcademicYearId,
        teacher_id: UserId,
        exclude: Option<ClassId>,
    ) -> Result<User, ClassError> {
        let teacher = self
            .store
            .find_teacher(school_id, teacher_id)
            .await?
            .ok_or(ClassError::TeacherNotFound)?;

        if let Some(existing) = self
            .store
            .find_class_by_teacher(year_id, teacher_id, exclude)
            .await?
        {
            return Err(ClassError::TeacherAlreadyAssigned {
                class_name: existing.name,
            });
        }

        if self
            .excluded_managers(school_id, year_id)
            .await?
            .contains(&teacher_id)
        {
            return Err(ClassError::TeacherInExcludedDepartment {
                department: self.policy.exclusion_department.clone(),
            });
        }

        Ok(teacher)
    }

    async fn expand(&self, class: Class) -> Result<ClassView, ClassError> {
        let mut views = self.expand_all(vec![class]).await?;
        views.pop().ok_or(ClassError::ClassNotFound)
    }

    /// Resolves the year, teacher and creator of each class.
    async fn expand_all(&self, classes: Vec<Class>) -> Result<Vec<ClassView>, ClassError> {
        let mut years: HashMap<AcademicYearId, Option<AcademicYearSummary>> = HashMap::new();
        for class in &classes {
            if !years.contains_key(&class.academic_year_id) {
                let year = self
                    .store
                    .find_academic_year(class.school_id, class.academic_year_id)
                    .await?;
                years.insert(
                    class.academic_year_id,
                    year.as_ref().map(AcademicYearSummary::from),
                );
            }
        }

        let mut user_ids: Vec<UserId> = classes
            .iter()
            .flat_map(|c| [c.home_room_teacher, c.created_by])
            .collect();
        user_ids.sort();
        user_ids.dedup();
        let users: HashMap<UserId, UserSummary> = self
            .store
            .find_users(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        Ok(classes
            .into_iter()
            .map(|class| {
                let year = years.get(&class.academic_year_id).cloned().flatten();
                let teacher = users.get(&class.home_room_teacher).cloned();
                let creator = users.get(&class.created_by).cloned();
                ClassView::expand(class, year, teacher, creator)
            })
            .collect())
    }
}
