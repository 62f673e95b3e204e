//! Participant data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in match slots and lookups).
pub type ParticipantId = Uuid;

/// A participant in a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// 1..N, unique and dense once seeding has run. Zero until then.
    pub seed: u32,
    pub wins: u32,
    pub losses: u32,
    /// Final standing, set once the participant can no longer move.
    pub placement: Option<u32>,
}

impl Participant {
    /// Create a new participant with a fresh id. Counters start at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Create a participant with an id supplied by the roster source.
    pub fn with_id(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            seed: 0,
            wins: 0,
            losses: 0,
            placement: None,
        }
    }

    /// Record a win for this participant.
    pub fn add_win(&mut self) {
        self.wins += 1;
    }

    /// Record a loss for this participant.
    pub fn add_loss(&mut self) {
        self.losses += 1;
    }

    pub fn is_unbeaten(&self) -> bool {
        self.losses == 0
    }
}
