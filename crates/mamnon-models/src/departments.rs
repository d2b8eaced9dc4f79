//! School departments. Only the manager list is relevant to class assignment.

use crate::ids::{AcademicYearId, DepartmentId, SchoolId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: DepartmentId,
    pub school_id: SchoolId,
    pub academic_year_id: AcademicYearId,
    pub name: String,
    pub manager_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Department {
    pub fn is_manager(&self, user_id: UserId) -> bool {
        self.manager_ids.contains(&user_id)
    }
}
