use crate::domains::logger::{DynLogger, FileLogger};
use std::sync::Arc;

use super::tracing_logger::init_tracing_logger;

/// Initialize the fast_log file logger and return it as an injectable domain logger.
pub fn init_file_logger(path: &str) -> Result<DynLogger, String> {
    let logger = FileLogger::init(path).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(logger))
}

/// File logger when `path` is configured and usable, otherwise the tracing bridge.
pub fn init_domain_logger(path: Option<&str>) -> DynLogger {
    match path {
        Some(path) => match init_file_logger(path) {
            Ok(logger) => logger,
            Err(e) => {
                tracing::warn!("{}; falling back to tracing", e);
                init_tracing_logger("snapshot_builder")
            }
        },
        None => init_tracing_logger("snapshot_builder"),
    }
}
