//! Academic year domain models and DTOs.
//!
//! An academic year is a school's yearly scheduling period (e.g. 2025-2026).
//! A school may keep many years, but only one is `active` at a time. Classes
//! can only be created, edited or removed while their year is active.

use crate::ids::{AcademicYearId, SchoolId};
use chrono::{DateTime, Utc};
use mamnon_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::text_enum::impl_text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum YearStatus {
    Active,
    Inactive,
}

impl_text_enum!(YearStatus {
    Active => "active",
    Inactive => "inactive",
});

/// Academic year entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AcademicYear {
    pub id: AcademicYearId,
    pub school_id: SchoolId,
    /// First calendar year of the period (e.g. 2025)
    pub from_year: i32,
    /// Last calendar year of the period (e.g. 2026)
    pub to_year: i32,
    pub status: YearStatus,
    /// Latched to true once the year has received its first class
    pub is_config: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AcademicYear {
    pub fn is_active(&self) -> bool {
        self.status == YearStatus::Active
    }

    /// Human-readable label, e.g. "2025-2026".
    pub fn label(&self) -> String {
        format!("{}-{}", self.from_year, self.to_year)
    }
}

/// Compact academic year embedded in expanded class views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AcademicYearSummary {
    pub id: AcademicYearId,
    pub from_year: i32,
    pub to_year: i32,
    pub status: YearStatus,
}

impl From<&AcademicYear> for AcademicYearSummary {
    fn from(year: &AcademicYear) -> Self {
        Self {
            id: year.id,
            from_year: year.from_year,
            to_year: year.to_year,
            status: year.status,
        }
    }
}

fn validate_year_range(dto: &CreateAcademicYearDto) -> Result<(), ValidationError> {
    if dto.from_year >= dto.to_year {
        let mut err = ValidationError::new("year_range");
        err.message = Some("from_year must be before to_year".into());
        return Err(err);
    }
    Ok(())
}

/// DTO for creating an academic year. New years start inactive.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_year_range", skip_on_field_errors = false))]
pub struct CreateAcademicYearDto {
    #[validate(range(min = 2000, max = 2100))]
    pub from_year: i32,
    #[validate(range(min = 2000, max = 2100))]
    pub to_year: i32,
}

/// Values the store needs to persist a new academic year.
#[derive(Debug, Clone)]
pub struct NewAcademicYear {
    pub school_id: SchoolId,
    pub from_year: i32,
    pub to_year: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedAcademicYearsResponse {
    pub data: Vec<AcademicYear>,
    pub meta: PaginationMeta,
}
