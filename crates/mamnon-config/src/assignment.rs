//! Homeroom assignment policy.
//!
//! Managers of one named department (by default the catering team,
//! "Tổ cấp dưỡng") may not be homeroom teachers in the same academic year.
//! The department name is configurable so the rule is not tied to a literal.

use std::env;

/// Department whose managers are barred from homeroom duty by default.
pub const DEFAULT_EXCLUSION_DEPARTMENT: &str = "Tổ cấp dưỡng";

/// Prefix used for generated class codes by default.
pub const DEFAULT_CLASS_CODE_PREFIX: &str = "LOP";

/// # Environment Variables
///
/// - `EXCLUSION_DEPARTMENT`: Department whose managers cannot be homeroom teachers
///   (default: `Tổ cấp dưỡng`)
/// - `CLASS_CODE_PREFIX`: Prefix for generated class codes (default: `LOP`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentPolicy {
    pub exclusion_department: String,
    pub class_code_prefix: String,
}

impl AssignmentPolicy {
    pub fn from_env() -> Self {
        Self {
            exclusion_department: env::var("EXCLUSION_DEPARTMENT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXCLUSION_DEPARTMENT.to_string()),
            class_code_prefix: env::var("CLASS_CODE_PREFIX")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CLASS_CODE_PREFIX.to_string()),
        }
    }

    pub fn with_exclusion_department(mut self, name: impl Into<String>) -> Self {
        self.exclusion_department = name.into();
        self
    }
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            exclusion_department: DEFAULT_EXCLUSION_DEPARTMENT.to_string(),
            class_code_prefix: DEFAULT_CLASS_CODE_PREFIX.to_string(),
        }
    }
}
