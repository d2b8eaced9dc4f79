//! Preschool grades, their age groups, and teaching sessions.
//!
//! Each grade owns a fixed set of age groups. A class must pick its age group
//! from the set of its own grade:
//!
//! | Grade | Age groups |
//! |-------|------------|
//! | Nhà trẻ | Nhà trẻ 1, Nhà trẻ 2, Nhà trẻ 3 |
//! | Mầm | Mầm 1, Mầm 2, Mầm 3 |
//! | Chồi | Chồi 1, Chồi 2, Chồi 3 |
//! | Lá | Lá 1, Lá 2, Lá 3 |

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::text_enum::impl_text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Grade {
    /// Nursery (under 3 years)
    #[serde(rename = "Nhà trẻ")]
    NhaTre,
    /// 3-4 years
    #[serde(rename = "Mầm")]
    Mam,
    /// 4-5 years
    #[serde(rename = "Chồi")]
    Choi,
    /// 5-6 years
    #[serde(rename = "Lá")]
    La,
}

impl_text_enum!(Grade {
    NhaTre => "Nhà trẻ",
    Mam => "Mầm",
    Choi => "Chồi",
    La => "Lá",
});

const NHA_TRE_AGE_GROUPS: &[&str] = &["Nhà trẻ 1", "Nhà trẻ 2", "Nhà trẻ 3"];
const MAM_AGE_GROUPS: &[&str] = &["Mầm 1", "Mầm 2", "Mầm 3"];
const CHOI_AGE_GROUPS: &[&str] = &["Chồi 1", "Chồi 2", "Chồi 3"];
const LA_AGE_GROUPS: &[&str] = &["Lá 1", "Lá 2", "Lá 3"];

impl Grade {
    /// The age groups a class of this grade may use.
    pub fn age_groups(&self) -> &'static [&'static str] {
        match self {
            Grade::NhaTre => NHA_TRE_AGE_GROUPS,
            Grade::Mam => MAM_AGE_GROUPS,
            Grade::Choi => CHOI_AGE_GROUPS,
            Grade::La => LA_AGE_GROUPS,
        }
    }

    pub fn accepts_age_group(&self, age_group: &str) -> bool {
        self.age_groups().contains(&age_group.trim())
    }
}

/// Response body for the age-group lookup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgeGroupsResponse {
    pub grade: Grade,
    pub age_groups: Vec<String>,
}

impl From<Grade> for AgeGroupsResponse {
    fn from(grade: Grade) -> Self {
        Self {
            grade,
            age_groups: grade.age_groups().iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Daily sessions a class is held in. At least one must be selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sessions {
    #[serde(default)]
    pub morning: bool,
    #[serde(default)]
    pub afternoon: bool,
    #[serde(default)]
    pub evening: bool,
}

impl Sessions {
    pub fn morning_only() -> Self {
        Self {
            morning: true,
            ..Self::default()
        }
    }

    pub fn any_selected(&self) -> bool {
        self.morning || self.afternoon || self.evening
    }
}
