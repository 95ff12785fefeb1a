//! Single worker that owns the scheduler.
//!
//! Voice-state changes and ticks are handled one at a time on this task, so
//! registrations never race with a tick in progress.

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};
use vs_control::VoiceStateChange;
use vs_sink::PointSink;

use crate::intake::Intake;
use crate::scheduler::CoalescingScheduler;

pub struct EngineConfig {
    pub tick_interval: Duration,
}

pub struct Engine {
    scheduler: CoalescingScheduler,
    intake: Intake,
    sink: Arc<dyn PointSink>,
    cfg: EngineConfig,
}

impl Engine {
    pub fn new(
        scheduler: CoalescingScheduler,
        intake: Intake,
        sink: Arc<dyn PointSink>,
        cfg: EngineConfig,
    ) -> Self {
        Self {
            scheduler,
            intake,
            sink,
            cfg,
        }
    }

    /// Run until `shutdown` resolves or the event stream closes.
    ///
    /// On exit, points already buffered are flushed once; pending actions are not run.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<VoiceStateChange>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let period = self.cfg.tick_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(tick_ms = period.as_millis() as u64, "tracker engine started");

        loop {
            tokio::select! {
                maybe = events.recv() => match maybe {
                    Some(change) => {
                        self.intake.on_change(&mut self.scheduler, &change).await;
                    }
                    None => {
                        warn!("voice event stream closed");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.scheduler.tick().await;
                }
                _ = &mut shutdown => break,
            }
        }

        if let Err(e) = self.sink.flush().await {
            warn!("final flush failed: {:#}", e);
        }
        if !self.scheduler.is_empty() {
            info!(
                pending = self.scheduler.len(),
                "pending snapshots dropped on shutdown"
            );
        }
        info!("tracker engine stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{NoopMetrics, TrackerMetrics};
    use vs_control::{ChannelId, ChannelKind, InMemoryStore};
    use vs_sink::MemorySink;

    struct Running {
        store: InMemoryStore,
        sink: Arc<MemorySink>,
        tx: mpsc::UnboundedSender<VoiceStateChange>,
        stop: tokio::sync::oneshot::Sender<()>,
        handle: tokio::task::JoinHandle<Result<()>>,
    }

    fn start(tick_ms: u64) -> Running {
        let store = InMemoryStore::new();
        let g = store.add_guild("g1", "Guild").id;
        store.add_channel(&g, "c1", "Lobby", ChannelKind::Voice).unwrap();

        let sink = Arc::new(MemorySink::new());
        let metrics: Arc<dyn TrackerMetrics> = Arc::new(NoopMetrics);
        let scheduler = CoalescingScheduler::new(sink.clone(), metrics.clone());
        let intake = Intake::new(Arc::new(store.clone()), sink.clone(), metrics);
        let engine = Engine::new(
            scheduler,
            intake,
            sink.clone(),
            EngineConfig {
                tick_interval: Duration::from_millis(tick_ms),
            },
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(engine.run(rx, async move {
            let _ = stop_rx.await;
        }));
        Running {
            store,
            sink,
            tx,
            stop,
            handle,
        }
    }

    /// Let the engine task drain whatever is ready.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_a_full_period() {
        let r = start(10_000);
        let ev = r.store.join("u1", "alice", &ChannelId::from("c1")).unwrap();
        r.tx.send(ev).unwrap();
        settle().await;

        tokio::time::advance(Duration::from_millis(9_999)).await;
        settle().await;
        assert_eq!(r.sink.flush_count(), 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(r.sink.flush_count(), 1);
        assert_eq!(r.sink.flushed_points().len(), 1);

        r.stop.send(()).unwrap();
        r.handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn events_between_ticks_collapse() {
        let r = start(1_000);
        let c1 = ChannelId::from("c1");
        for u in ["u1", "u2", "u3"] {
            r.tx.send(r.store.join(u, u, &c1).unwrap()).unwrap();
        }
        settle().await;

        tokio::time::advance(Duration::from_millis(1_000)).await;
        settle().await;

        // one snapshot of three members, not three snapshots
        let batches = r.sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);

        r.stop.send(()).unwrap();
        r.handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn closed_stream_stops_and_flushes() {
        let r = start(60_000);
        drop(r.tx);
        r.handle.await.unwrap().unwrap();
        // only the shutdown flush
        assert_eq!(r.sink.flush_count(), 1);
        assert!(r.sink.flushed_points().is_empty());
    }
}
