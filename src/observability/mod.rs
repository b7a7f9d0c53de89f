pub mod logging;
pub mod metrics;

pub use logging::{init_logging, run_span, LogConfig, LogFormat};
pub use metrics::{describe_metrics, get_metrics, LatencyTimer, Metrics, METRICS};
