//! Commands accepted by the engine and the events its transitions emit.

use crate::models::bracket::BracketId;
use crate::models::game::MatchId;
use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A state transition requested by the surrounding system.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BracketCommand {
    /// Mark a READY match as being played.
    StartMatch { match_id: MatchId },
    /// Record the outcome of a match.
    ReportResult {
        match_id: MatchId,
        winner_id: ParticipantId,
        #[serde(default)]
        score_1: Option<u32>,
        #[serde(default)]
        score_2: Option<u32>,
    },
}

/// Something that changed in the bracket, for persistence and UI consumers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BracketEvent {
    MatchReady {
        match_id: MatchId,
    },
    MatchStarted {
        match_id: MatchId,
    },
    MatchCompleted {
        match_id: MatchId,
        winner_id: ParticipantId,
        loser_id: ParticipantId,
    },
    /// Resolved without play; `participant_id` is None when nobody was routed in.
    ByeAwarded {
        match_id: MatchId,
        participant_id: Option<ParticipantId>,
    },
    ParticipantAdvanced {
        match_id: MatchId,
        participant_id: ParticipantId,
    },
    /// The losers champion won the first grand final; the reset match is live.
    BracketReset {
        match_id: MatchId,
    },
    /// The reset match turned out to be unnecessary.
    MatchSkipped {
        match_id: MatchId,
    },
    BracketCompleted {
        bracket_id: BracketId,
        completed_at: DateTime<Utc>,
    },
}
