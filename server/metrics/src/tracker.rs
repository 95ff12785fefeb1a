use metrics::{counter, gauge, histogram};

/// Metric names under: {ns}_tracker_*
pub struct TrackerMetricsImpl {
    ns: &'static str,
}

impl TrackerMetricsImpl {
    pub fn new(namespace: &'static str) -> Self {
        Self { ns: namespace }
    }

    #[inline]
    pub fn event(&self, outcome: &'static str) {
        counter!(format!("{}_tracker_events_total", self.ns), "outcome" => outcome).increment(1);
    }

    #[inline]
    pub fn tick(&self, seconds: f64) {
        counter!(format!("{}_tracker_ticks_total", self.ns)).increment(1);
        histogram!(format!("{}_tracker_tick_seconds", self.ns)).record(seconds);
    }

    #[inline]
    pub fn action_failed(&self) {
        counter!(format!("{}_tracker_action_failures_total", self.ns)).increment(1);
    }

    #[inline]
    pub fn evicted(&self, n: usize) {
        counter!(format!("{}_tracker_evictions_total", self.ns)).increment(n as u64);
    }

    #[inline]
    pub fn points(&self, n: usize) {
        counter!(format!("{}_tracker_points_total", self.ns)).increment(n as u64);
    }

    #[inline]
    pub fn flush_failed(&self) {
        counter!(format!("{}_tracker_flush_failures_total", self.ns)).increment(1);
    }

    #[inline]
    pub fn pending(&self, n: usize) {
        gauge!(format!("{}_tracker_pending_actions", self.ns)).set(n as f64);
    }
}
