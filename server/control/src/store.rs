use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

use crate::{
    Channel, ChannelId, ChannelKind, ControlError, ControlResult, Guild, GuildId, Occupant,
    UserId, VoiceDirectory, VoiceStateChange,
};

/// In-process directory. Every mutation returns the notification a gateway would deliver.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
pub struct Inner {
    guilds: HashMap<GuildId, Guild>,
    channels: HashMap<ChannelId, Channel>,
    usernames: HashMap<UserId, String>,
    nicknames: HashMap<(GuildId, UserId), String>,
    // user -> channel they are connected to
    voice: HashMap<UserId, ChannelId>,
    // channel -> users in join order
    occupants: HashMap<ChannelId, Vec<UserId>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        let g = self.inner.read();
        f(&g)
    }

    pub fn with_write<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut g = self.inner.write();
        f(&mut g)
    }

    pub fn add_guild(&self, id: impl Into<GuildId>, name: impl Into<String>) -> Guild {
        let guild = Guild {
            id: id.into(),
            name: name.into(),
        };
        self.with_write(|s| s.guilds.insert(guild.id.clone(), guild.clone()));
        guild
    }

    pub fn add_channel(
        &self,
        guild_id: &GuildId,
        id: impl Into<ChannelId>,
        name: impl Into<String>,
        kind: ChannelKind,
    ) -> ControlResult<Channel> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ControlError::InvalidArgument("channel name empty"));
        }
        self.with_write(|s| -> ControlResult<Channel> {
            let guild = s
                .guilds
                .get(guild_id)
                .cloned()
                .ok_or(ControlError::NotFound("guild"))?;
            let ch = Channel {
                id: id.into(),
                guild,
                name,
                kind,
            };
            s.channels.insert(ch.id.clone(), ch.clone());
            Ok(ch)
        })
    }

    /// Deletes the channel and disconnects everyone in it.
    pub fn remove_channel(&self, id: &ChannelId) -> ControlResult<Vec<VoiceStateChange>> {
        self.with_write(|s| -> ControlResult<Vec<VoiceStateChange>> {
            let ch = s
                .channels
                .remove(id)
                .ok_or(ControlError::NotFound("channel"))?;
            let users = s.occupants.remove(id).unwrap_or_default();
            Ok(users
                .into_iter()
                .map(|uid| {
                    s.voice.remove(&uid);
                    VoiceStateChange {
                        guild_id: ch.guild.id.clone(),
                        previous: Some(ch.id.clone()),
                        next: None,
                    }
                })
                .collect())
        })
    }

    pub fn rename_channel(&self, id: &ChannelId, name: impl Into<String>) -> ControlResult<()> {
        self.with_write(|s| -> ControlResult<()> {
            let ch = s
                .channels
                .get_mut(id)
                .ok_or(ControlError::NotFound("channel"))?;
            ch.name = name.into();
            Ok(())
        })
    }

    pub fn set_nickname(&self, guild_id: &GuildId, user_id: &UserId, nickname: Option<String>) {
        self.with_write(|s| {
            let key = (guild_id.clone(), user_id.clone());
            match nickname {
                Some(n) => s.nicknames.insert(key, n),
                None => s.nicknames.remove(&key),
            };
        });
    }

    /// Connects the user to `channel_id`, moving them out of any channel they were in.
    pub fn join(
        &self,
        user_id: impl Into<UserId>,
        username: impl Into<String>,
        channel_id: &ChannelId,
    ) -> ControlResult<VoiceStateChange> {
        let user_id = user_id.into();
        self.with_write(|s| -> ControlResult<VoiceStateChange> {
            let guild_id = s
                .channels
                .get(channel_id)
                .map(|c| c.guild.id.clone())
                .ok_or(ControlError::NotFound("channel"))?;

            let previous = s.voice.insert(user_id.clone(), channel_id.clone());
            if let Some(prev) = previous.as_ref().filter(|p| *p != channel_id) {
                if let Some(list) = s.occupants.get_mut(prev) {
                    list.retain(|u| u != &user_id);
                }
            }
            let list = s.occupants.entry(channel_id.clone()).or_default();
            if !list.contains(&user_id) {
                list.push(user_id.clone());
            }
            s.usernames.insert(user_id, username.into());

            Ok(VoiceStateChange {
                guild_id,
                previous,
                next: Some(channel_id.clone()),
            })
        })
    }

    pub fn leave(&self, user_id: &UserId) -> ControlResult<VoiceStateChange> {
        self.with_write(|s| -> ControlResult<VoiceStateChange> {
            let prev = s
                .voice
                .remove(user_id)
                .ok_or(ControlError::NotFound("voice state"))?;
            if let Some(list) = s.occupants.get_mut(&prev) {
                list.retain(|u| u != user_id);
            }
            let guild_id = s
                .channels
                .get(&prev)
                .map(|c| c.guild.id.clone())
                .ok_or(ControlError::NotFound("channel"))?;
            Ok(VoiceStateChange {
                guild_id,
                previous: Some(prev),
                next: None,
            })
        })
    }

    pub fn channel_of(&self, user_id: &UserId) -> Option<ChannelId> {
        self.with_read(|s| s.voice.get(user_id).cloned())
    }
}

impl Inner {
    /// A channel only resolves within the guild that owns it.
    fn channel_in(&self, guild_id: &GuildId, id: &ChannelId) -> Option<&Channel> {
        self.channels.get(id).filter(|c| &c.guild.id == guild_id)
    }

    fn occupants_of(&self, channel: &Channel) -> Vec<Occupant> {
        self.occupants
            .get(&channel.id)
            .into_iter()
            .flatten()
            .map(|uid| Occupant {
                user_id: uid.clone(),
                nickname: self
                    .nicknames
                    .get(&(channel.guild.id.clone(), uid.clone()))
                    .cloned(),
                username: self.usernames.get(uid).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl VoiceDirectory for InMemoryStore {
    async fn channel(&self, guild_id: &GuildId, id: &ChannelId) -> Option<Channel> {
        self.with_read(|s| s.channel_in(guild_id, id).cloned())
    }

    async fn occupants(
        &self,
        guild_id: &GuildId,
        id: &ChannelId,
    ) -> ControlResult<Vec<Occupant>> {
        self.with_read(|s| -> ControlResult<Vec<Occupant>> {
            let ch = s
                .channel_in(guild_id, id)
                .ok_or(ControlError::NotFound("channel"))?;
            Ok(s.occupants_of(ch))
        })
    }
}
