//! Strongly-typed ID newtypes for domain entities.
//!
//! Each entity gets its own wrapper around `Uuid`, so a `UserId` can never be
//! passed where an `AcademicYearId` is expected.
//!
//! ```ignore
//! use mamnon_models::ids::{ClassId, UserId};
//!
//! fn assign(class: ClassId, teacher: UserId) { /* ... */ }
//!
//! assign(ClassId::new(), UserId::new());
//! // assign(UserId::new(), ClassId::new()); // does not compile
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Defines a `Uuid` newtype stored as a Postgres `UUID` and exposed as a string.
///
/// `sqlx(transparent)` also provides the array type, so `UUID[]` columns decode
/// into `Vec<Id>`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Fixed ids for fixtures.
            pub const fn from_u128(v: u128) -> Self {
                Self(Uuid::from_u128(v))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

define_id!(
    /// Strongly-typed ID for users (staff accounts, including teachers).
    UserId
);

define_id!(
    /// Strongly-typed ID for schools (tenants).
    SchoolId
);

define_id!(
    /// Strongly-typed ID for academic years.
    AcademicYearId
);

define_id!(
    /// Strongly-typed ID for class rows.
    ClassId
);

define_id!(
    /// Strongly-typed ID for departments.
    DepartmentId
);
