use anyhow::anyhow;
use mamnon_core::AppError;
use mamnon_models::grades::Grade;

use crate::modules::school_scope::ScopeError;
use crate::store::StoreError;

/// Failures of the class assignment rules.
#[derive(Debug, thiserror::Error)]
pub enum ClassError {
    #[error("No active academic year found for this school")]
    NoActiveYear,

    #[error("Academic year not found")]
    AcademicYearNotFound,

    #[error("Class not found")]
    ClassNotFound,

    #[error("Academic year is not active; its classes cannot be changed")]
    YearNotActive,

    #[error("Class name '{0}' already exists in this academic year")]
    DuplicateName(String),

    #[error("Age group '{age_group}' is not valid for grade '{grade}'")]
    InvalidAgeGroup { grade: Grade, age_group: String },

    #[error("At least one session (morning, afternoon or evening) must be selected")]
    NoSessionSelected,

    #[error("Teacher not found or not an active teacher of this school")]
    TeacherNotFound,

    #[error("Teacher is already homeroom teacher of class '{class_name}' in this academic year")]
    TeacherAlreadyAssigned { class_name: String },

    #[error("Teacher manages '{department}' and cannot be a homeroom teacher in the same academic year")]
    TeacherInExcludedDepartment { department: String },

    #[error("Destination academic year already has classes")]
    DestinationNotEmpty,

    #[error("Source academic year has no classes to copy")]
    SourceEmpty,

    #[error("No eligible teachers in the destination academic year; no classes were copied")]
    NoEligibleTeachers,

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ClassError> for AppError {
    fn from(err: ClassError) -> Self {
        match err {
            ClassError::Scope(err) => err.into(),
            ClassError::Store(err) => err.into(),
            ClassError::NoActiveYear
            | ClassError::AcademicYearNotFound
            | ClassError::ClassNotFound
            | ClassError::TeacherNotFound
            | ClassError::SourceEmpty => AppError::not_found(anyhow!("{}", err)),
            ClassError::YearNotActive => AppError::forbidden(anyhow!("{}", err)),
            ClassError::DuplicateName(_)
            | ClassError::TeacherAlreadyAssigned { .. }
            | ClassError::TeacherInExcludedDepartment { .. }
            | ClassError::DestinationNotEmpty => AppError::conflict(anyhow!("{}", err)),
            ClassError::InvalidAgeGroup { .. }
            | ClassError::NoSessionSelected
            | ClassError::NoEligibleTeachers => AppError::bad_request(anyhow!("{}", err)),
        }
    }
}
