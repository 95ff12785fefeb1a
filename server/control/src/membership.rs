use crate::UserId;

/// A user currently connected to a channel, as reported by the event source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupant {
    pub user_id: UserId,
    /// Guild-local nickname, if one is set.
    pub nickname: Option<String>,
    pub username: String,
}

/// An occupant with its display name resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub display_name: String,
}

impl Occupant {
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }

    pub fn resolve(&self) -> Member {
        Member {
            id: self.user_id.clone(),
            display_name: self.display_name().to_string(),
        }
    }
}

pub fn resolve_members(occupants: &[Occupant]) -> Vec<Member> {
    occupants.iter().map(Occupant::resolve).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupant(nickname: Option<&str>) -> Occupant {
        Occupant {
            user_id: UserId::from("42"),
            nickname: nickname.map(str::to_string),
            username: "ferris".to_string(),
        }
    }

    #[test]
    fn nickname_wins_over_username() {
        let m = occupant(Some("crab")).resolve();
        assert_eq!(m.id, UserId::from("42"));
        assert_eq!(m.display_name, "crab");
    }

    #[test]
    fn falls_back_to_username() {
        assert_eq!(occupant(None).resolve().display_name, "ferris");
    }
}
