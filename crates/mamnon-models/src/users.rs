//! Staff accounts as seen by the class assignment rules.

use crate::ids::{ClassId, SchoolId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::text_enum::impl_text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Principal,
    Teacher,
    Staff,
}

impl_text_enum!(UserRole {
    Admin => "admin",
    Principal => "principal",
    Teacher => "teacher",
    Staff => "staff",
});

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub school_id: Option<SchoolId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_destroyed: bool,
    /// Class this user is homeroom teacher of, if any
    pub class_id: Option<ClassId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this user can be picked as a homeroom teacher in `school_id`.
    pub fn is_assignable_teacher(&self, school_id: SchoolId) -> bool {
        self.role == UserRole::Teacher
            && self.is_active
            && !self.is_destroyed
            && self.school_id == Some(school_id)
    }
}

/// Public projection of a user, used in expanded class views and teacher lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
        }
    }
}
