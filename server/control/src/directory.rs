use crate::{Channel, ChannelId, ControlResult, GuildId, Occupant};

/// Live view of the event source. Lookups are never cached by callers.
///
/// Channels are addressed within their guild, which every voice-state
/// notification carries.
#[async_trait::async_trait]
pub trait VoiceDirectory: Send + Sync {
    /// Resolve a channel handle. `None` for stale or unknown ids.
    async fn channel(&self, guild_id: &GuildId, id: &ChannelId) -> Option<Channel>;

    /// Users connected to the channel right now.
    async fn occupants(
        &self,
        guild_id: &GuildId,
        id: &ChannelId,
    ) -> ControlResult<Vec<Occupant>>;
}
