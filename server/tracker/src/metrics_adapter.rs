use std::sync::Arc;

use vs_metrics::TrackerMetricsImpl;

use crate::scheduler::TrackerMetrics;

pub fn tracker_metrics(namespace: &'static str) -> Arc<dyn TrackerMetrics> {
    Arc::new(PromTrackerMetrics {
        inner: TrackerMetricsImpl::new(namespace),
    })
}

struct PromTrackerMetrics {
    inner: TrackerMetricsImpl,
}

impl TrackerMetrics for PromTrackerMetrics {
    fn inc_events_accepted(&self) {
        self.inner.event("accepted");
    }
    fn inc_events_ignored(&self) {
        self.inner.event("ignored");
    }
    fn inc_action_failed(&self) {
        self.inner.action_failed();
    }
    fn inc_evicted(&self, n: usize) {
        self.inner.evicted(n);
    }
    fn inc_points(&self, n: usize) {
        self.inner.points(n);
    }
    fn inc_flush_failed(&self) {
        self.inner.flush_failed();
    }
    fn set_pending(&self, n: usize) {
        self.inner.pending(n);
    }
    fn observe_tick(&self, seconds: f64) {
        self.inner.tick(seconds);
    }
}
