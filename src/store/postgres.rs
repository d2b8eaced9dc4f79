//! PostgreSQL-backed [`SchoolStore`](super::SchoolStore).

use async_trait::async_trait;
use mamnon_core::PaginationParams;
use mamnon_models::academic_years::{AcademicYear, NewAcademicYear};
use mamnon_models::classes::{Class, NewClass};
use mamnon_models::departments::Department;
use mamnon_models::ids::{AcademicYearId, ClassId, SchoolId, UserId};
use mamnon_models::users::{User, UserRole};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{
    AcademicYearRepository, ClassQuery, ClassRepository, DepartmentRepository, StoreError,
    UniqueConstraint, UserRepository,
};

const ACADEMIC_YEAR_COLUMNS: &str =
    "id, school_id, from_year, to_year, status, is_config, created_at, updated_at";

const USER_COLUMNS: &str = "id, school_id, first_name, last_name, email, role, is_active, \
     is_destroyed, class_id, created_at, updated_at";

const CLASS_COLUMNS: &str = "id, class_code, school_id, academic_year_id, grade, age_group, \
     name, home_room_teacher, morning, afternoon, evening, description, created_by, \
     is_destroyed, created_at, updated_at";

/// Maps unique-index violations onto the rule they protect.
fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = match db_err.constraint() {
                Some("classes_name_per_year_unique") => Some(UniqueConstraint::ClassName),
                Some("classes_teacher_per_year_unique") => Some(UniqueConstraint::HomeroomTeacher),
                Some("classes_class_code_key") => Some(UniqueConstraint::ClassCode),
                Some("academic_years_school_range_unique") => {
                    Some(UniqueConstraint::AcademicYearRange)
                }
                Some("academic_years_one_active_per_school") => {
                    Some(UniqueConstraint::ActiveAcademicYear)
                }
                _ => None,
            };
            if let Some(constraint) = constraint {
                return StoreError::Conflict(constraint);
            }
        }
    }
    StoreError::Database(err)
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AcademicYearRepository for PgStore {
    async fn find_active_year(
        &self,
        school_id: SchoolId,
    ) -> Result<Option<AcademicYear>, StoreError> {
        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {ACADEMIC_YEAR_COLUMNS} FROM academic_years \
             WHERE school_id = $1 AND status = 'active'"
        ))
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(year)
    }

    async fn find_academic_year(
        &self,
        school_id: SchoolId,
        id: AcademicYearId,
    ) -> Result<Option<AcademicYear>, StoreError> {
        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {ACADEMIC_YEAR_COLUMNS} FROM academic_years WHERE id = $1 AND school_id = $2"
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(year)
    }

    async fn mark_year_configured(&self, id: AcademicYearId) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE academic_years SET is_config = TRUE, updated_at = NOW() \
             WHERE id = $1 AND is_config = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_academic_year(
        &self,
        year: NewAcademicYear,
    ) -> Result<AcademicYear, StoreError> {
        sqlx::query_as::<_, AcademicYear>(&format!(
            "INSERT INTO academic_years (id, school_id, from_year, to_year) \
             VALUES ($1, $2, $3, $4) RETURNING {ACADEMIC_YEAR_COLUMNS}"
        ))
        .bind(AcademicYearId::new())
        .bind(year.school_id)
        .bind(year.from_year)
        .bind(year.to_year)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_academic_years(
        &self,
        school_id: SchoolId,
        pagination: &PaginationParams,
    ) -> Result<(Vec<AcademicYear>, i64), StoreError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM academic_years WHERE school_id = $1",
        )
        .bind(school_id)
        .fetch_one(&self.pool)
        .await?;

        let years = sqlx::query_as::<_, AcademicYear>(&format!(
            "SELECT {ACADEMIC_YEAR_COLUMNS} FROM academic_years WHERE school_id = $1 \
             ORDER BY from_year DESC, created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(school_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((years, total))
    }

    async fn activate_academic_year(
        &self,
        school_id: SchoolId,
        id: AcademicYearId,
    ) -> Result<AcademicYear, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE academic_years SET status = 'inactive', updated_at = NOW() \
             WHERE school_id = $1 AND status = 'active' AND id <> $2",
        )
        .bind(school_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let year = sqlx::query_as::<_, AcademicYear>(&format!(
            "UPDATE academic_years SET status = 'active', updated_at = NOW() \
             WHERE id = $1 AND school_id = $2 RETURNING {ACADEMIC_YEAR_COLUMNS}"
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or(StoreError::Missing("Academic year"))?;

        tx.commit().await?;
        Ok(year)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_destroyed = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_teacher(
        &self,
        school_id: SchoolId,
        id: UserId,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE id = $1 AND school_id = $2 AND role = $3 \
               AND is_active = TRUE AND is_destroyed = FALSE"
        ))
        .bind(id)
        .bind(school_id)
        .bind(UserRole::Teacher)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_active_teachers(&self, school_id: SchoolId) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE school_id = $1 AND role = $2 AND is_active = TRUE AND is_destroyed = FALSE \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(school_id)
        .bind(UserRole::Teacher)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn set_homeroom_class(
        &self,
        teacher_id: UserId,
        class_id: Option<ClassId>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET class_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(teacher_id)
            .bind(class_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn reassign_homeroom(
        &self,
        class_id: ClassId,
        from: UserId,
        to: UserId,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE users SET class_id = NULL, updated_at = NOW() WHERE id = $1 AND class_id = $2",
        )
        .bind(from)
        .bind(class_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET class_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(to)
            .bind(class_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DepartmentRepository for PgStore {
    async fn find_department(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
        name: &str,
    ) -> Result<Option<Department>, StoreError> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT id, school_id, academic_year_id, name, manager_ids, created_at, updated_at \
             FROM departments WHERE school_id = $1 AND academic_year_id = $2 AND name = $3",
        )
        .bind(school_id)
        .bind(academic_year_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }
}

#[async_trait]
impl ClassRepository for PgStore {
    async fn find_class(
        &self,
        school_id: SchoolId,
        id: ClassId,
    ) -> Result<Option<Class>, StoreError> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes \
             WHERE id = $1 AND school_id = $2 AND is_destroyed = FALSE"
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(class)
    }

    async fn find_class_by_name(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
        name: &str,
        exclude: Option<ClassId>,
    ) -> Result<Option<Class>, StoreError> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes \
             WHERE school_id = $1 AND academic_year_id = $2 AND name = $3 \
               AND is_destroyed = FALSE AND ($4::uuid IS NULL OR id <> $4) \
             LIMIT 1"
        ))
        .bind(school_id)
        .bind(academic_year_id)
        .bind(name)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(class)
    }

    async fn find_class_by_teacher(
        &self,
        academic_year_id: AcademicYearId,
        teacher_id: UserId,
        exclude: Option<ClassId>,
    ) -> Result<Option<Class>, StoreError> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes \
             WHERE academic_year_id = $1 AND home_room_teacher = $2 \
               AND is_destroyed = FALSE AND ($3::uuid IS NULL OR id <> $3) \
             LIMIT 1"
        ))
        .bind(academic_year_id)
        .bind(teacher_id)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(class)
    }

    async fn list_classes_in_year(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
    ) -> Result<Vec<Class>, StoreError> {
        let classes = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes \
             WHERE school_id = $1 AND academic_year_id = $2 AND is_destroyed = FALSE \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(school_id)
        .bind(academic_year_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(classes)
    }

    async fn count_classes_in_year(
        &self,
        school_id: SchoolId,
        academic_year_id: AcademicYearId,
    ) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM classes \
             WHERE school_id = $1 AND academic_year_id = $2 AND is_destroyed = FALSE",
        )
        .bind(school_id)
        .bind(academic_year_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert_class(&self, class: NewClass) -> Result<Class, StoreError> {
        sqlx::query_as::<_, Class>(&format!(
            "INSERT INTO classes (id, class_code, school_id, academic_year_id, grade, age_group, \
                 name, home_room_teacher, morning, afternoon, evening, description, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(ClassId::new())
        .bind(&class.class_code)
        .bind(class.school_id)
        .bind(class.academic_year_id)
        .bind(class.grade)
        .bind(&class.age_group)
        .bind(&class.name)
        .bind(class.home_room_teacher)
        .bind(class.sessions.morning)
        .bind(class.sessions.afternoon)
        .bind(class.sessions.evening)
        .bind(&class.description)
        .bind(class.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn update_class(&self, class: &Class) -> Result<Class, StoreError> {
        sqlx::query_as::<_, Class>(&format!(
            "UPDATE classes SET grade = $2, age_group = $3, name = $4, home_room_teacher = $5, \
                 morning = $6, afternoon = $7, evening = $8, description = $9, \
                 updated_at = NOW() \
             WHERE id = $1 AND is_destroyed = FALSE \
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(class.id)
        .bind(class.grade)
        .bind(&class.age_group)
        .bind(&class.name)
        .bind(class.home_room_teacher)
        .bind(class.sessions.morning)
        .bind(class.sessions.afternoon)
        .bind(class.sessions.evening)
        .bind(&class.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(StoreError::Missing("Class"))
    }

    async fn soft_delete_class(&self, id: ClassId) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE classes SET is_destroyed = TRUE, updated_at = NOW() \
             WHERE id = $1 AND is_destroyed = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn search_classes(&self, query: &ClassQuery) -> Result<(Vec<Class>, i64), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM classes");
        push_class_filters(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {CLASS_COLUMNS} FROM classes"));
        push_class_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(query.pagination.limit())
            .push(" OFFSET ")
            .push_bind(query.pagination.offset());
        let classes = select
            .build_query_as::<Class>()
            .fetch_all(&self.pool)
            .await?;

        Ok((classes, total))
    }
}

fn push_class_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ClassQuery) {
    builder
        .push(" WHERE is_destroyed = FALSE AND school_id = ")
        .push_bind(query.school_id);

    if let Some(year) = query.academic_year_id {
        builder.push(" AND academic_year_id = ").push_bind(year);
    }
    if let Some(grade) = query.grade {
        builder.push(" AND grade = ").push_bind(grade);
    }
    if let Some(pattern) = query.name_like_pattern() {
        builder
            .push(" AND LOWER(name) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'");
    }
}
