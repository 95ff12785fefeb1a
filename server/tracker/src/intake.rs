//! Event intake: turns raw voice-state changes into pending snapshot actions.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use vs_control::{resolve_members, ChannelId, GuildId, VoiceDirectory, VoiceStateChange};
use vs_sink::PointSink;

use crate::points::PointBuilder;
use crate::scheduler::{Action, CoalescingScheduler, Outcome, TrackerMetrics};

pub struct Intake {
    directory: Arc<dyn VoiceDirectory>,
    sink: Arc<dyn PointSink>,
    metrics: Arc<dyn TrackerMetrics>,
}

impl Intake {
    pub fn new(
        directory: Arc<dyn VoiceDirectory>,
        sink: Arc<dyn PointSink>,
        metrics: Arc<dyn TrackerMetrics>,
    ) -> Self {
        Self {
            directory,
            sink,
            metrics,
        }
    }

    /// Register (or replace) the snapshot action for the channel this change affects.
    ///
    /// Returns the channel that was scheduled, or `None` if the change was ignored.
    pub async fn on_change(
        &self,
        scheduler: &mut CoalescingScheduler,
        change: &VoiceStateChange,
    ) -> Option<ChannelId> {
        let Some(affected) = change.affected() else {
            self.metrics.inc_events_ignored();
            return None;
        };

        let Some(channel) = self.directory.channel(&change.guild_id, affected).await else {
            debug!(
                channel_id = %affected,
                guild_id = %change.guild_id,
                "unresolvable channel, ignoring"
            );
            self.metrics.inc_events_ignored();
            return None;
        };

        let action = SnapshotAction {
            guild_id: change.guild_id.clone(),
            channel_id: channel.id.clone(),
            directory: self.directory.clone(),
            sink: self.sink.clone(),
            metrics: self.metrics.clone(),
        };
        if scheduler.register(channel.id.clone(), Arc::new(action)) {
            debug!(channel_id = %channel.id, "coalesced into pending snapshot");
        }
        self.metrics.inc_events_accepted();
        Some(channel.id)
    }
}

/// Snapshot of one channel, taken from live membership when the tick runs.
struct SnapshotAction {
    guild_id: GuildId,
    channel_id: ChannelId,
    directory: Arc<dyn VoiceDirectory>,
    sink: Arc<dyn PointSink>,
    metrics: Arc<dyn TrackerMetrics>,
}

#[async_trait::async_trait]
impl Action for SnapshotAction {
    async fn execute(&self) -> anyhow::Result<Outcome> {
        let Some(channel) = self.directory.channel(&self.guild_id, &self.channel_id).await else {
            debug!(channel_id = %self.channel_id, "channel no longer exists");
            return Ok(Outcome::Evict);
        };
        if !channel.is_voice() {
            return Ok(Outcome::Keep);
        }

        let occupants = self
            .directory
            .occupants(&self.guild_id, &channel.id)
            .await
            .with_context(|| format!("list occupants of {}", channel.id))?;
        let members = resolve_members(&occupants);

        info!(
            guild = %channel.guild.name,
            channel = %channel.name,
            members = members.len(),
            "signaling for {} members",
            members.len()
        );

        if members.is_empty() {
            return Ok(Outcome::Evict);
        }

        let points = PointBuilder::new(&channel).build(&members);
        let n = points.len();
        for p in points {
            self.sink.write_point(p);
        }
        self.metrics.inc_points(n);
        Ok(Outcome::Keep)
    }
}
