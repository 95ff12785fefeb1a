//! Discord event source: serenity gateway events in, cache lookups out.

use std::sync::Arc;

use serenity::all::{
    Cache, ChannelId as DiscordChannelId, ChannelType, Context, EventHandler,
    GuildId as DiscordGuildId, Ready, VoiceState,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use vs_control::{
    Channel, ChannelId, ChannelKind, ControlError, ControlResult, Guild, GuildId, Occupant, UserId,
    VoiceDirectory, VoiceStateChange,
};

/// Forwards voice-state updates to the engine. Never blocks the shard.
pub struct VoiceEvents {
    tx: mpsc::UnboundedSender<VoiceStateChange>,
}

impl VoiceEvents {
    pub fn new(tx: mpsc::UnboundedSender<VoiceStateChange>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl EventHandler for VoiceEvents {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "logged in to discord");
    }

    async fn voice_state_update(&self, _ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(guild_id) = new.guild_id.or_else(|| old.as_ref().and_then(|o| o.guild_id)) else {
            return;
        };

        let change = VoiceStateChange {
            guild_id: GuildId::new(guild_id.get().to_string()),
            previous: old.and_then(|o| o.channel_id).map(to_channel_id),
            next: new.channel_id.map(to_channel_id),
        };
        if self.tx.send(change).is_err() {
            warn!("engine stopped, dropping voice state update");
        }
    }
}

/// Live membership from serenity's cache.
pub struct DiscordDirectory {
    cache: Arc<Cache>,
}

impl DiscordDirectory {
    pub fn new(cache: Arc<Cache>) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl VoiceDirectory for DiscordDirectory {
    async fn channel(&self, guild_id: &GuildId, id: &ChannelId) -> Option<Channel> {
        let gid = parse_guild_id(guild_id)?;
        let cid = parse_channel_id(id)?;
        let guild = self.cache.guild(gid)?;
        let ch = guild.channels.get(&cid)?;

        Some(Channel {
            id: id.clone(),
            guild: Guild {
                id: guild_id.clone(),
                name: guild.name.clone(),
            },
            name: ch.name.clone(),
            kind: channel_kind(ch.kind),
        })
    }

    async fn occupants(
        &self,
        guild_id: &GuildId,
        id: &ChannelId,
    ) -> ControlResult<Vec<Occupant>> {
        let gid = parse_guild_id(guild_id).ok_or(ControlError::NotFound("guild"))?;
        let cid = parse_channel_id(id).ok_or(ControlError::NotFound("channel"))?;
        let guild = self.cache.guild(gid).ok_or(ControlError::NotFound("guild"))?;
        if !guild.channels.contains_key(&cid) {
            return Err(ControlError::NotFound("channel"));
        }

        let occupants = guild
            .voice_states
            .values()
            .filter(|vs| vs.channel_id == Some(cid))
            .map(|vs| {
                // the guild member list can lag behind the voice state's own copy
                let member = guild.members.get(&vs.user_id).or(vs.member.as_ref());
                Occupant {
                    user_id: UserId::new(vs.user_id.get().to_string()),
                    nickname: member.and_then(|m| m.nick.clone()),
                    username: member.map(|m| m.user.name.clone()).unwrap_or_default(),
                }
            })
            .collect();
        Ok(occupants)
    }
}

fn to_channel_id(id: DiscordChannelId) -> ChannelId {
    ChannelId::new(id.get().to_string())
}

fn parse_channel_id(id: &ChannelId) -> Option<DiscordChannelId> {
    id.as_str()
        .parse::<u64>()
        .ok()
        .filter(|v| *v != 0)
        .map(DiscordChannelId::new)
}

fn parse_guild_id(id: &GuildId) -> Option<DiscordGuildId> {
    id.as_str()
        .parse::<u64>()
        .ok()
        .filter(|v| *v != 0)
        .map(DiscordGuildId::new)
}

fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Voice => ChannelKind::Voice,
        ChannelType::Stage => ChannelKind::Stage,
        ChannelType::Text => ChannelKind::Text,
        _ => ChannelKind::Other,
    }
}
