//! # Mamnon Models
//!
//! Domain models and DTOs shared by the Mamnon API and CLI.
//!
//! - [`ids`]: Strongly-typed entity ids
//! - [`grades`]: Grades, their age groups, and teaching sessions
//! - [`academic_years`]: Academic years and their lifecycle status
//! - [`classes`]: Classes, expanded views, and request/response DTOs
//! - [`users`]: Staff accounts
//! - [`departments`]: Departments and their managers

mod text_enum;

pub mod academic_years;
pub mod classes;
pub mod departments;
pub mod grades;
pub mod ids;
pub mod users;

pub use text_enum::UnknownVariant;
