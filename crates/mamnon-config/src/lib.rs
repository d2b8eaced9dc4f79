//! # Mamnon Config
//!
//! Configuration types for the Mamnon API, loaded from environment variables:
//!
//! - [`server`]: HTTP bind address
//! - [`cors`]: Allowed browser origins
//! - [`storage`]: Storage backend selection and database pool settings
//! - [`assignment`]: Homeroom assignment policy (excluded department, class codes)
//!
//! # Example
//!
//! ```ignore
//! use mamnon_config::{AssignmentPolicy, CorsConfig, ServerConfig, StorageConfig};
//!
//! let server = ServerConfig::from_env();
//! let cors = CorsConfig::from_env();
//! let storage = StorageConfig::from_env()?;
//! let policy = AssignmentPolicy::from_env();
//! ```

pub mod assignment;
pub mod cors;
pub mod server;
pub mod storage;

pub use assignment::AssignmentPolicy;
pub use cors::CorsConfig;
pub use server::ServerConfig;
pub use storage::{ConfigError, StorageBackend, StorageConfig};
