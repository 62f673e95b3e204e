//! Match node of the bracket graph, its slots, status and stage.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a match.
pub type MatchId = uuid::Uuid;

/// One of the two participant slots of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    One,
    Two,
}

/// Lifecycle of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting on one or both feeder matches.
    #[default]
    Pending,
    /// Resolved without being played (one or zero participants, or an unneeded reset).
    Bye,
    /// Both slots populated, no result yet.
    Ready,
    InProgress,
    Completed,
}

impl MatchStatus {
    /// BYE and COMPLETED never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Bye | MatchStatus::Completed)
    }
}

/// Which part of the bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Winners,
    Losers,
    ThirdPlace,
    /// First grand-finals match (winners champion vs losers champion).
    GrandFinal,
    /// Only played when the losers champion takes the first grand final.
    GrandFinalReset,
}

/// A single match in the bracket graph.
///
/// `next_position` / `loser_next_position` index into the owning bracket's
/// match list; `next_match` / `loser_next_match` are the same references
/// resolved to ids for consumers that only see ids.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: u32,
    /// 1-based number within its round and stage.
    pub match_number: u32,
    /// Index in the bracket's match list, stable from generation on.
    pub position: usize,
    pub stage: Stage,
    pub slot_1: Option<ParticipantId>,
    pub slot_2: Option<ParticipantId>,
    /// None until decided (and for byes that had nobody to advance).
    pub winner: Option<ParticipantId>,
    pub score_1: Option<u32>,
    pub score_2: Option<u32>,
    pub status: MatchStatus,
    pub next_match: Option<MatchId>,
    pub loser_next_match: Option<MatchId>,
    pub next_position: Option<usize>,
    pub loser_next_position: Option<usize>,
    /// Feeder matches that have not resolved yet.
    pub pending_feeders: u8,
    /// Placement given to the winner when this match ends their run.
    pub winner_placement: Option<u32>,
    /// Placement given to the loser when this match eliminates them.
    pub loser_placement: Option<u32>,
}

impl GameMatch {
    pub fn is_winners_bracket(&self) -> bool {
        self.stage == Stage::Winners
    }

    pub fn is_third_place(&self) -> bool {
        self.stage == Stage::ThirdPlace
    }

    /// Both slots hold a participant.
    pub fn is_populated(&self) -> bool {
        self.slot_1.is_some() && self.slot_2.is_some()
    }

    pub fn slot(&self, slot: Slot) -> Option<ParticipantId> {
        match slot {
            Slot::One => self.slot_1,
            Slot::Two => self.slot_2,
        }
    }

    /// Which slot holds `participant`, if any.
    pub fn slot_of(&self, participant: ParticipantId) -> Option<Slot> {
        if self.slot_1 == Some(participant) {
            Some(Slot::One)
        } else if self.slot_2 == Some(participant) {
            Some(Slot::Two)
        } else {
            None
        }
    }

    /// The participant facing `participant` in this match.
    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        match self.slot_of(participant)? {
            Slot::One => self.slot_2,
            Slot::Two => self.slot_1,
        }
    }

    /// Put `participant` into the first empty slot. Returns the slot used,
    /// or None when both slots are already taken.
    pub fn fill_first_empty_slot(&mut self, participant: ParticipantId) -> Option<Slot> {
        if self.slot_1.is_none() {
            self.slot_1 = Some(participant);
            Some(Slot::One)
        } else if self.slot_2.is_none() {
            self.slot_2 = Some(participant);
            Some(Slot::Two)
        } else {
            None
        }
    }
}
