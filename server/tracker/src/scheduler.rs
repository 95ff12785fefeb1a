//! Coalescing scheduler.
//!
//! Holds at most one pending action per channel. Registering again for the
//! same channel replaces the earlier action, so a burst of voice-state events
//! collapses into one snapshot per channel per tick.
//!
//! The scheduler is owned by a single worker (see `engine`); `register`,
//! `remove` and `tick` are never interleaved, so the map needs no lock.

use std::{collections::HashMap, sync::Arc, time::Instant};

use tracing::{debug, warn};
use vs_control::ChannelId;
use vs_sink::PointSink;

/// What an action asks the scheduler to do with its entry afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Keep,
    /// Channel is empty (or gone); drop the entry until the next event for it.
    Evict,
}

/// Deferred unit of work, run once per tick while registered.
#[async_trait::async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self) -> anyhow::Result<Outcome>;
}

/// Metrics hook for the tracker. Implemented over Prometheus in `metrics_adapter`.
pub trait TrackerMetrics: Send + Sync {
    fn inc_events_accepted(&self);
    fn inc_events_ignored(&self);
    fn inc_action_failed(&self);
    fn inc_evicted(&self, n: usize);
    fn inc_points(&self, n: usize);
    fn inc_flush_failed(&self);
    fn set_pending(&self, n: usize);
    fn observe_tick(&self, seconds: f64);
}

pub struct NoopMetrics;

impl TrackerMetrics for NoopMetrics {
    fn inc_events_accepted(&self) {}
    fn inc_events_ignored(&self) {}
    fn inc_action_failed(&self) {}
    fn inc_evicted(&self, _n: usize) {}
    fn inc_points(&self, _n: usize) {}
    fn inc_flush_failed(&self) {}
    fn set_pending(&self, _n: usize) {}
    fn observe_tick(&self, _seconds: f64) {}
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub executed: usize,
    pub failed: usize,
    pub evicted: usize,
    pub flushed: usize,
    pub flush_error: Option<String>,
}

pub struct CoalescingScheduler {
    pending: HashMap<ChannelId, Arc<dyn Action>>,
    sink: Arc<dyn PointSink>,
    metrics: Arc<dyn TrackerMetrics>,
}

impl CoalescingScheduler {
    pub fn new(sink: Arc<dyn PointSink>, metrics: Arc<dyn TrackerMetrics>) -> Self {
        Self {
            pending: HashMap::new(),
            sink,
            metrics,
        }
    }

    /// Insert or overwrite the pending action for `channel`. Returns true if one was replaced.
    pub fn register(&mut self, channel: ChannelId, action: Arc<dyn Action>) -> bool {
        let replaced = self.pending.insert(channel, action).is_some();
        self.metrics.set_pending(self.pending.len());
        replaced
    }

    pub fn remove(&mut self, channel: &ChannelId) -> bool {
        let removed = self.pending.remove(channel).is_some();
        self.metrics.set_pending(self.pending.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, channel: &ChannelId) -> bool {
        self.pending.contains_key(channel)
    }

    /// Run every action registered at the start of the tick, then flush the sink once.
    ///
    /// Action order is unspecified. A failing action is logged and skipped;
    /// it never stops the others or the flush.
    pub(crate) async fn tick(&mut self) -> TickReport {
        let started = Instant::now();
        let due: Vec<(ChannelId, Arc<dyn Action>)> = self
            .pending
            .iter()
            .map(|(id, action)| (id.clone(), action.clone()))
            .collect();

        let mut report = TickReport::default();
        let mut evict = Vec::new();

        for (channel_id, action) in due {
            report.executed += 1;
            match action.execute().await {
                Ok(Outcome::Keep) => {}
                Ok(Outcome::Evict) => evict.push(channel_id),
                Err(e) => {
                    report.failed += 1;
                    self.metrics.inc_action_failed();
                    warn!(%channel_id, "snapshot action failed: {:#}", e);
                }
            }
        }

        for channel_id in &evict {
            self.remove(channel_id);
        }
        report.evicted = evict.len();
        if report.evicted > 0 {
            self.metrics.inc_evicted(report.evicted);
        }

        match self.sink.flush().await {
            Ok(n) => report.flushed = n,
            Err(e) => {
                self.metrics.inc_flush_failed();
                warn!("sink flush failed, points dropped: {:#}", e);
                report.flush_error = Some(e.to_string());
            }
        }

        self.metrics.observe_tick(started.elapsed().as_secs_f64());
        debug!(
            executed = report.executed,
            failed = report.failed,
            evicted = report.evicted,
            flushed = report.flushed,
            pending = self.pending.len(),
            "tick done"
        );
        report
    }
}
