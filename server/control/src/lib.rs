pub mod channels;
pub mod directory;
pub mod errors;
pub mod events;
pub mod ids;
pub mod membership;
pub mod store;

pub use channels::{Channel, ChannelKind, Guild};
pub use directory::VoiceDirectory;
pub use errors::{ControlError, ControlResult};
pub use events::VoiceStateChange;
pub use ids::{ChannelId, GuildId, UserId};
pub use membership::{resolve_members, Member, Occupant};
pub use store::InMemoryStore;
