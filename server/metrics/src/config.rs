#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Bind address for the Prometheus scrape endpoint, e.g. 0.0.0.0:9100
    pub listen: String,

    /// Prefix for every exported metric name
    pub namespace: &'static str,
}
