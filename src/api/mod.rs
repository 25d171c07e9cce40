//! API layer
//!
//! HTTP handlers for:
//! - The authenticated birthday view
//! - Metrics (Prometheus)

mod app;
pub mod metrics;

pub use app::app_router;
pub use metrics::metrics_router;
