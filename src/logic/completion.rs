//! Bracket-completion monitor and derived progress state.

use crate::models::{Bracket, BracketEvent, BracketStatus};
use chrono::{DateTime, Utc};

/// Every match is COMPLETED or BYE.
pub fn is_complete(bracket: &Bracket) -> bool {
    bracket.matches.iter().all(|m| m.status.is_terminal())
}

/// Flip the bracket to COMPLETED once every match is terminal.
///
/// Returns the completion event only on the call that performs the flip;
/// calling it again is harmless.
pub fn check_completion(bracket: &mut Bracket, now: DateTime<Utc>) -> Option<BracketEvent> {
    if bracket.status == BracketStatus::Completed || !is_complete(bracket) {
        return None;
    }
    bracket.status = BracketStatus::Completed;
    bracket.completed_at = Some(now);
    bracket.current_round = bracket.round_count;
    log::info!("Bracket {} completed", bracket.id);
    Some(BracketEvent::BracketCompleted {
        bracket_id: bracket.id,
        completed_at: now,
    })
}

/// Lowest round that still has an unresolved match.
pub fn refresh_current_round(bracket: &mut Bracket) {
    bracket.current_round = bracket
        .matches
        .iter()
        .filter(|m| !m.status.is_terminal())
        .map(|m| m.round)
        .min()
        .unwrap_or(bracket.round_count);
}
