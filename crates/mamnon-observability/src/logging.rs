use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// # Environment Variables
///
/// - `LOG_LEVEL`: Level for the `mamnon` crates when `RUST_LOG` is unset (default: `info`)
/// - `LOG_DIR`: Directory for rolling JSON log files (default: `storage/logs`)
/// - `LOG_JSON_FILES`: Write daily JSON log files to `LOG_DIR` (default: `false`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: String,
    pub json_files: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or(defaults.level),
            dir: std::env::var("LOG_DIR").unwrap_or(defaults.dir),
            json_files: std::env::var("LOG_JSON_FILES")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.json_files),
        }
    }

    fn filter_directives(&self) -> String {
        format!(
            "mamnon={level},mamnon_cli={level},tower_http=warn,hyper=warn,sqlx=warn",
            level = self.level
        )
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.filter_directives()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "storage/logs".to_string(),
            json_files: false,
        }
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(config.env_filter());

    if config.json_files {
        let appender = tracing_appender::rolling::daily(&config.dir, "mamnon.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(config.env_filter());

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .init();
        info!(dir = %config.dir, "JSON file logging enabled");
        Some(guard)
    } else {
        tracing_subscriber::registry().with(console_layer).init();
        None
    }
}

/// Routes log output through the test harness so it only shows for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mamnon=debug")),
        )
        .with_test_writer()
        .try_init();
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = uuid::Uuid::new_v4().to_string();

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        500..=599 => error!(%request_id, %method, %path, status, latency_ms, "Server error"),
        400..=499 => warn!(%request_id, %method, %path, status, latency_ms, "Client error"),
        _ => info!(%request_id, %method, %path, status, latency_ms, "Request completed"),
    }

    response
}
