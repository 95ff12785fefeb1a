pub mod config;
pub mod http;
pub mod tracker;

pub use config::MetricsConfig;
pub use http::MetricsServer;
pub use tracker::TrackerMetricsImpl;
