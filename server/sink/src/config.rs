use std::time::Duration;

#[derive(Clone, Debug)]
pub struct InfluxConfig {
    /// Base URL, e.g. http://localhost:8086
    pub host: String,
    pub token: String,
    pub org: String,
    pub bucket: String,

    /// Oldest lines are dropped past this many buffered lines.
    pub max_buffer_lines: usize,

    pub timeout: Duration,
}

impl InfluxConfig {
    pub fn new(host: String, token: String, org: String, bucket: String) -> Self {
        Self {
            host,
            token,
            org,
            bucket,
            max_buffer_lines: 32_000,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn write_url(&self) -> String {
        format!("{}/api/v2/write", self.host.trim_end_matches('/'))
    }
}
