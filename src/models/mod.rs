//! Data structures for the bracket engine: participants, matches, brackets, events.

mod bracket;
mod event;
mod game;
mod participant;

pub use bracket::{Bracket, BracketError, BracketId, BracketStatus, BracketType};
pub use event::{BracketCommand, BracketEvent};
pub use game::{GameMatch, MatchId, MatchStatus, Slot, Stage};
pub use participant::{Participant, ParticipantId};
