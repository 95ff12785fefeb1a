use vs_control::{Channel, Member};
use vs_sink::DataPoint;

pub const MEASUREMENT: &str = "voice_state";

/// Turns a channel's members into `voice_state` points, one per member.
pub struct PointBuilder<'a> {
    channel: &'a Channel,
}

impl<'a> PointBuilder<'a> {
    pub fn new(channel: &'a Channel) -> Self {
        Self { channel }
    }

    pub fn build(&self, members: &[Member]) -> Vec<DataPoint> {
        members
            .iter()
            .map(|m| {
                DataPoint::new(MEASUREMENT)
                    .tag("server_id", self.channel.guild.id.as_str())
                    .tag("channel_id", self.channel.id.as_str())
                    .string_field("user_id", m.id.as_str())
                    .string_field("channel_name", self.channel.name.as_str())
                    .string_field("user_nickname", m.display_name.as_str())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vs_control::{ChannelId, ChannelKind, Guild, GuildId, UserId};

    fn channel() -> Channel {
        Channel {
            id: ChannelId::from("c1"),
            guild: Guild {
                id: GuildId::from("g1"),
                name: "Guild".into(),
            },
            name: "Lobby".into(),
            kind: ChannelKind::Voice,
        }
    }

    fn member(id: &str, name: &str) -> Member {
        Member {
            id: UserId::from(id),
            display_name: name.into(),
        }
    }

    #[test]
    fn one_point_per_member() {
        let ch = channel();
        let points = PointBuilder::new(&ch).build(&[member("u1", "alice"), member("u2", "bob")]);
        assert_eq!(points.len(), 2);

        let p = &points[1];
        assert_eq!(p.measurement, "voice_state");
        assert_eq!(p.tag_value("server_id"), Some("g1"));
        assert_eq!(p.tag_value("channel_id"), Some("c1"));
        assert_eq!(p.field_value("user_id"), Some("u2"));
        assert_eq!(p.field_value("channel_name"), Some("Lobby"));
        assert_eq!(p.field_value("user_nickname"), Some("bob"));
        assert_eq!(p.tags.len(), 2);
        assert_eq!(p.fields.len(), 3);
    }

    #[test]
    fn no_members_no_points() {
        let ch = channel();
        assert!(PointBuilder::new(&ch).build(&[]).is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        let ch = channel();
        let members = [member("u1", "alice")];
        let b = PointBuilder::new(&ch);
        assert_eq!(b.build(&members), b.build(&members));
    }
}
