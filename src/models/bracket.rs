//! Bracket, BracketType, BracketStatus and the engine's error type.

use crate::models::game::{GameMatch, MatchId};
use crate::models::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during bracket operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BracketError {
    /// Fewer than two participants.
    #[error("Need at least 2 participants (got {count})")]
    InvalidRosterSize { count: usize },
    /// The same participant id appears twice in the roster.
    #[error("Participant {0} appears more than once in the roster")]
    DuplicateParticipant(ParticipantId),
    /// Too many participants for an elimination bracket.
    #[error("Elimination brackets support at most {max} participants (got {count})")]
    UnsupportedBracketSize { count: usize, max: usize },
    /// Only single and double elimination brackets can be generated.
    #[error("Bracket type {0} is not supported")]
    UnsupportedBracketType(BracketType),
    #[error("Bracket {0} not found")]
    BracketNotFound(BracketId),
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    /// The reported winner does not occupy either slot of the match.
    #[error("Participant {winner_id} is not playing in match {match_id}")]
    InvalidWinner {
        match_id: MatchId,
        winner_id: ParticipantId,
    },
    /// A different result was already recorded for the match.
    #[error("Match {0} already has a result")]
    MatchAlreadyComplete(MatchId),
    /// The match is still waiting on a feeder match.
    #[error("Match {0} is not ready to be played")]
    MatchNotReady(MatchId),
    /// The winner's score is lower than the loser's.
    #[error("Winner score {winner_score} is lower than loser score {loser_score}")]
    InvalidScore { winner_score: u32, loser_score: u32 },
    /// A participant was routed into a match whose slots were both taken.
    #[error("Both slots of match {0} are already occupied")]
    SlotOccupied(MatchId),
}

/// Unique identifier for a bracket.
pub type BracketId = Uuid;

/// Bracket format. Round robin and Swiss exist as tags only.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    #[default]
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl BracketType {
    pub fn is_elimination(self) -> bool {
        matches!(
            self,
            BracketType::SingleElimination | BracketType::DoubleElimination
        )
    }
}

impl std::fmt::Display for BracketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketType::SingleElimination => write!(f, "single_elimination"),
            BracketType::DoubleElimination => write!(f, "double_elimination"),
            BracketType::RoundRobin => write!(f, "round_robin"),
            BracketType::Swiss => write!(f, "swiss"),
        }
    }
}

/// Overall progress of the bracket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    /// Generated; no match started or reported yet.
    #[default]
    NotStarted,
    InProgress,
    /// Every match is COMPLETED or BYE.
    Completed,
}

/// Full bracket state: participants, match graph and progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub bracket_type: BracketType,
    /// Smallest power of two >= participant count.
    pub bracket_size: u32,
    pub winners_rounds: u32,
    /// Zero for single elimination.
    pub losers_rounds: u32,
    pub round_count: u32,
    /// Lowest round that still has an unresolved match.
    pub current_round: u32,
    /// True only when a third-place match was actually generated.
    pub third_place_match: bool,
    pub status: BracketStatus,
    /// Ordered by seed.
    pub participants: Vec<Participant>,
    /// Indexed by `GameMatch::position`.
    pub matches: Vec<GameMatch>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Bracket {
    /// Position of a match in `matches` by id.
    pub fn match_position(&self, id: MatchId) -> Option<usize> {
        self.matches.iter().position(|m| m.id == id)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn get_participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Participant holding the given seed.
    pub fn participant_by_seed(&self, seed: u32) -> Option<&Participant> {
        self.participants.iter().find(|p| p.seed == seed)
    }

    /// Matches of one round, in match-number order.
    pub fn round_matches(&self, round: u32) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    /// Participant placed first, once the bracket is decided.
    pub fn champion(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.placement == Some(1))
    }
}
