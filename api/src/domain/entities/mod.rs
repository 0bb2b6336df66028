//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the wire shapes used by the store adapters.

pub mod idea;
pub mod presence;

pub use idea::{FilterMode, IdeaId, IdeaRecord, NewIdea, Snapshot, Vote};
pub use presence::PresenceSet;
