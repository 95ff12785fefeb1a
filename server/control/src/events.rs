use crate::{ChannelId, GuildId};

/// One raw voice-state notification: a user moved from `previous` to `next`.
///
/// Joining has no `previous`, disconnecting has no `next`. Mute/deafen updates
/// carry the same channel on both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceStateChange {
    pub guild_id: GuildId,
    pub previous: Option<ChannelId>,
    pub next: Option<ChannelId>,
}

impl VoiceStateChange {
    /// The channel whose occupancy needs a fresh snapshot; the destination wins.
    pub fn affected(&self) -> Option<&ChannelId> {
        self.next.as_ref().or(self.previous.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(previous: Option<&str>, next: Option<&str>) -> VoiceStateChange {
        VoiceStateChange {
            guild_id: GuildId::from("g"),
            previous: previous.map(ChannelId::from),
            next: next.map(ChannelId::from),
        }
    }

    #[test]
    fn destination_is_preferred() {
        assert_eq!(change(Some("a"), Some("b")).affected(), Some(&ChannelId::from("b")));
        assert_eq!(change(None, Some("b")).affected(), Some(&ChannelId::from("b")));
    }

    #[test]
    fn disconnect_points_at_previous() {
        assert_eq!(change(Some("a"), None).affected(), Some(&ChannelId::from("a")));
    }

    #[test]
    fn nothing_to_resolve() {
        assert_eq!(change(None, None).affected(), None);
    }
}
