use crate::{ChannelId, GuildId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    Voice,
    Stage,
    Text,
    Other,
}

impl ChannelKind {
    /// Stage channels carry voice states too.
    pub fn is_voice(self) -> bool {
        matches!(self, ChannelKind::Voice | ChannelKind::Stage)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub guild: Guild,
    pub name: String,
    pub kind: ChannelKind,
}

impl Channel {
    pub fn is_voice(&self) -> bool {
        self.kind.is_voice()
    }
}
