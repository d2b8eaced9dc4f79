//! # Mamnon Core
//!
//! Core types shared by every Mamnon crate:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination parameters and response metadata
//! - [`serde`]: Custom serde deserialization helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use mamnon_core::{AppError, PaginationMeta, PaginationParams};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Class not found"));
//!
//! let params = PaginationParams::default();
//! let meta = PaginationMeta::new(&params, 42);
//! ```

pub mod errors;
pub mod pagination;
pub mod serde;

pub use errors::{AppError, ErrorKind, ErrorResponse};
pub use pagination::{PaginationMeta, PaginationParams};
