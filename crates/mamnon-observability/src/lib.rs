//! # Mamnon Observability
//!
//! Logging for the Mamnon API:
//!
//! - [`init_tracing`]: compact console output plus an optional rolling JSON file
//! - [`logging_middleware`]: one access-log line per HTTP request
//! - [`init_test_tracing`]: test-friendly subscriber that is safe to call repeatedly
//!
//! ```no_run
//! use mamnon_observability::{LoggingConfig, init_tracing};
//!
//! let _guard = init_tracing(&LoggingConfig::from_env());
//! tracing::info!("ready");
//! ```

pub mod logging;

pub use logging::{LoggingConfig, init_test_tracing, init_tracing, logging_middleware};
