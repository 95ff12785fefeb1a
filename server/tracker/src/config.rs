use clap::Parser;
use std::time::Duration;
use vs_sink::InfluxConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "vs-tracker", about = "Voice channel occupancy tracker")]
pub struct Config {
    /// Discord bot token
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// InfluxDB base URL, e.g. http://localhost:8086
    #[arg(long, env = "INFLUXDB_HOST")]
    pub influx_host: String,

    #[arg(long, env = "INFLUXDB_TOKEN", hide_env_values = true)]
    pub influx_token: String,

    #[arg(long, env = "INFLUXDB_ORG")]
    pub influx_org: String,

    #[arg(long, env = "INFLUXDB_BUCKET")]
    pub influx_bucket: String,

    /// Snapshot period; every pending channel is written at most once per tick
    #[arg(
        long,
        env = "TICK_INTERVAL_MS",
        default_value_t = 10_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_interval_ms: u64,

    /// Lines kept in memory between flushes before the oldest are dropped
    #[arg(long, env = "INFLUXDB_MAX_BUFFER_LINES", default_value_t = 32_000)]
    pub influx_max_buffer_lines: usize,

    #[arg(long, env = "INFLUXDB_TIMEOUT_MS", default_value_t = 10_000)]
    pub influx_timeout_ms: u64,

    /// Prometheus scrape address, e.g. 0.0.0.0:9100 (disabled if unset)
    #[arg(long, env = "METRICS_LISTEN")]
    pub metrics_listen: Option<String>,
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn influx(&self) -> InfluxConfig {
        let mut cfg = InfluxConfig::new(
            self.influx_host.clone(),
            self.influx_token.clone(),
            self.influx_org.clone(),
            self.influx_bucket.clone(),
        );
        cfg.max_buffer_lines = self.influx_max_buffer_lines;
        cfg.timeout = Duration::from_millis(self.influx_timeout_ms);
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::{Mutex, MutexGuard};

    const ENV_VARS: [&str; 9] = [
        "DISCORD_BOT_TOKEN",
        "INFLUXDB_HOST",
        "INFLUXDB_TOKEN",
        "INFLUXDB_ORG",
        "INFLUXDB_BUCKET",
        "TICK_INTERVAL_MS",
        "INFLUXDB_MAX_BUFFER_LINES",
        "INFLUXDB_TIMEOUT_MS",
        "METRICS_LISTEN",
    ];

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests that parse config and clears every variable clap reads.
    fn clean_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock();
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        guard
    }

    const REQUIRED: [&str; 11] = [
        "vs-tracker",
        "--discord-token",
        "d",
        "--influx-host",
        "http://influx:8086",
        "--influx-token",
        "t",
        "--influx-org",
        "o",
        "--influx-bucket",
        "b",
    ];

    #[test]
    fn defaults() {
        let _env = clean_env();
        let cfg = Config::try_parse_from(REQUIRED).unwrap();
        assert_eq!(cfg.tick_interval(), Duration::from_secs(10));
        assert_eq!(cfg.metrics_listen, None);

        let influx = cfg.influx();
        assert_eq!(influx.write_url(), "http://influx:8086/api/v2/write");
        assert_eq!(influx.max_buffer_lines, 32_000);
        assert_eq!(influx.timeout, Duration::from_secs(10));
    }

    #[test]
    fn tick_interval_must_be_positive() {
        let _env = clean_env();
        let mut args = REQUIRED.to_vec();
        args.extend(["--tick-interval-ms", "0"]);
        assert!(Config::try_parse_from(args).is_err());

        let mut args = REQUIRED.to_vec();
        args.extend(["--tick-interval-ms", "2500"]);
        let cfg = Config::try_parse_from(args).unwrap();
        assert_eq!(cfg.tick_interval(), Duration::from_millis(2500));
    }

    #[test]
    fn missing_required_setting_is_rejected() {
        let _env = clean_env();
        let args: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|a| *a != "--influx-bucket" && *a != "b")
            .collect();
        assert!(Config::try_parse_from(args).is_err());
    }

    #[test]
    fn settings_fall_back_to_env() {
        let _env = clean_env();
        std::env::set_var("INFLUXDB_BUCKET", "from-env");
        std::env::set_var("TICK_INTERVAL_MS", "500");
        let args = REQUIRED[..REQUIRED.len() - 2].to_vec();
        let cfg = Config::try_parse_from(args);
        for var in ENV_VARS {
            std::env::remove_var(var);
        }

        let cfg = cfg.unwrap();
        assert_eq!(cfg.influx_bucket, "from-env");
        assert_eq!(cfg.tick_interval(), Duration::from_millis(500));
    }
}
