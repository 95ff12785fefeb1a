use std::collections::VecDeque;

use chrono::Utc;
use parking_lot::Mutex;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::{line, DataPoint, InfluxConfig, PointSink, SinkError, SinkResult};

/// Buffers encoded lines and ships them to the InfluxDB v2 write API on `flush`.
pub struct InfluxSink {
    http: reqwest::Client,
    write_url: String,
    auth: String,
    org: String,
    bucket: String,
    max_buffer_lines: usize,
    buffer: Mutex<VecDeque<String>>,
}

impl InfluxSink {
    pub fn new(cfg: InfluxConfig) -> SinkResult<Self> {
        let http = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            http,
            write_url: cfg.write_url(),
            auth: format!("Token {}", cfg.token),
            org: cfg.org,
            bucket: cfg.bucket,
            max_buffer_lines: cfg.max_buffer_lines.max(1),
            buffer: Mutex::new(VecDeque::new()),
        })
    }

    pub fn buffered(&self) -> usize {
        self.buffer.lock().len()
    }
}

#[async_trait::async_trait]
impl PointSink for InfluxSink {
    fn write_point(&self, point: DataPoint) {
        let Some(line) = line::encode(&point, Utc::now().timestamp_nanos_opt()) else {
            debug!(measurement = %point.measurement, "point without fields skipped");
            return;
        };

        let mut buf = self.buffer.lock();
        if buf.len() >= self.max_buffer_lines {
            buf.pop_front();
            warn!(max = self.max_buffer_lines, "influx buffer full, dropped oldest line");
        }
        buf.push_back(line);
    }

    async fn flush(&self) -> SinkResult<usize> {
        let lines = std::mem::take(&mut *self.buffer.lock());
        if lines.is_empty() {
            return Ok(0);
        }

        let n = lines.len();
        let body = Vec::from(lines).join("\n");

        let resp = self
            .http
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, &self.auth)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(lines = n, "influx flush ok");
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sink(host: &str, max_buffer_lines: usize) -> InfluxSink {
        let mut cfg = InfluxConfig::new(host.into(), "t0k".into(), "org".into(), "bucket".into());
        cfg.max_buffer_lines = max_buffer_lines;
        cfg.timeout = Duration::from_secs(2);
        InfluxSink::new(cfg).unwrap()
    }

    fn point(user: &str) -> DataPoint {
        DataPoint::new("voice_state").tag("channel_id", "c").string_field("user_id", user)
    }

    #[test]
    fn buffer_cap_drops_oldest() {
        let s = sink("http://127.0.0.1:1", 2);
        s.write_point(point("a"));
        s.write_point(point("b"));
        s.write_point(point("c"));
        assert_eq!(s.buffered(), 2);

        let buf = s.buffer.lock();
        assert!(buf[0].contains("user_id=\"b\""));
        assert!(buf[1].contains("user_id=\"c\""));
    }

    #[test]
    fn lines_are_stamped_at_write_time() {
        let s = sink("http://127.0.0.1:1", 10);
        let before = Utc::now().timestamp_nanos_opt().unwrap();
        s.write_point(point("a"));

        let buf = s.buffer.lock();
        let ts: i64 = buf[0].rsplit(' ').next().unwrap().parse().unwrap();
        assert!(ts >= before);
    }

    #[test]
    fn fieldless_points_are_not_buffered() {
        let s = sink("http://127.0.0.1:1", 10);
        s.write_point(DataPoint::new("voice_state").tag("channel_id", "c"));
        assert_eq!(s.buffered(), 0);
    }

    #[tokio::test]
    async fn empty_flush_skips_the_network() {
        let s = sink("http://127.0.0.1:1", 10);
        assert_eq!(s.flush().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_flush_drops_the_batch() {
        // nothing listens on port 1
        let s = sink("http://127.0.0.1:1/", 10);
        s.write_point(point("a"));
        s.write_point(point("b"));

        assert!(s.flush().await.is_err());
        assert_eq!(s.buffered(), 0);
    }

    #[test]
    fn write_url_tolerates_trailing_slash() {
        let cfg = InfluxConfig::new(
            "http://influx:8086/".into(),
            "t".into(),
            "o".into(),
            "b".into(),
        );
        assert_eq!(cfg.write_url(), "http://influx:8086/api/v2/write");
    }
}
