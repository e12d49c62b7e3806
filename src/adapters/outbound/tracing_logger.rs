use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Routes domain log lines into the process-wide `tracing` subscriber.
struct TracingBridge {
    target: &'static str,
}

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "building_map", component = self.target, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "building_map", component = self.target, "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "building_map", component = self.target, "{}", msg);
    }
}

pub fn init_tracing_logger(component: &'static str) -> DynLogger {
    Arc::new(TracingBridge { target: component })
}
