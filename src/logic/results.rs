//! Match-result processing: validate a reported outcome, record it and route
//! winner and loser through the match graph.
//!
//! Routing is an arena walk over `GameMatch::position`. Each delivery fills
//! the target's first empty slot and counts down its pending feeders; once a
//! match has no feeders left it either becomes READY or resolves as a bye,
//! which in turn delivers onward.

use crate::logic::completion::{check_completion, refresh_current_round};
use crate::models::{
    Bracket, BracketCommand, BracketError, BracketEvent, BracketStatus, GameMatch, MatchId,
    MatchStatus, Participant, ParticipantId, Slot, Stage,
};
use chrono::Utc;

/// Outcome of an accepted `report_result` call.
#[derive(Clone, Debug)]
pub struct ResultReport {
    /// The reported match after the transition.
    pub updated_match: GameMatch,
    pub events: Vec<BracketEvent>,
    /// True only on the call that completed the bracket.
    pub bracket_completed: bool,
    /// The same result had already been recorded; nothing changed.
    pub duplicate: bool,
}

/// Record the result of a match and advance the bracket.
///
/// Re-reporting the winner (and scores, if given) already recorded is a
/// no-op flagged as `duplicate`; any other report on a finished match fails
/// with `MatchAlreadyComplete`. On error the bracket is left untouched.
pub fn report_result(
    bracket: &mut Bracket,
    match_id: MatchId,
    winner_id: ParticipantId,
    score_1: Option<u32>,
    score_2: Option<u32>,
) -> Result<ResultReport, BracketError> {
    let position = bracket
        .match_position(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    let m = &bracket.matches[position];

    if m.status.is_terminal() {
        if is_same_result(m, winner_id, score_1, score_2) {
            log::debug!("Ignoring repeated result for match {}", match_id);
            return Ok(ResultReport {
                updated_match: m.clone(),
                events: Vec::new(),
                bracket_completed: false,
                duplicate: true,
            });
        }
        log::warn!("Rejected result for finished match {}", match_id);
        return Err(BracketError::MatchAlreadyComplete(match_id));
    }
    let winner_slot = m.slot_of(winner_id).ok_or_else(|| {
        log::warn!("Rejected result for match {}: {} is not playing", match_id, winner_id);
        BracketError::InvalidWinner {
            match_id,
            winner_id,
        }
    })?;
    if !matches!(m.status, MatchStatus::Ready | MatchStatus::InProgress) {
        return Err(BracketError::MatchNotReady(match_id));
    }
    let loser_id = m
        .opponent_of(winner_id)
        .ok_or(BracketError::MatchNotReady(match_id))?;
    validate_scores(winner_slot, score_1, score_2)?;

    // Work on a copy and commit by assignment so a failure part-way through
    // routing cannot leave the bracket half-updated.
    let mut working = bracket.clone();
    let mut events = Vec::new();
    record_result(
        &mut working,
        position,
        winner_id,
        loser_id,
        (score_1, score_2),
        &mut events,
    )?;
    refresh_current_round(&mut working);
    let completion = check_completion(&mut working, Utc::now());
    let bracket_completed = completion.is_some();
    events.extend(completion);

    *bracket = working;
    Ok(ResultReport {
        updated_match: bracket.matches[position].clone(),
        events,
        bracket_completed,
        duplicate: false,
    })
}

/// Mark a READY match as in progress. Starting an in-progress match again is a no-op.
pub fn start_match(
    bracket: &mut Bracket,
    match_id: MatchId,
) -> Result<Vec<BracketEvent>, BracketError> {
    let position = bracket
        .match_position(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    let m = &mut bracket.matches[position];
    match m.status {
        MatchStatus::Ready => {
            m.status = MatchStatus::InProgress;
            if bracket.status == BracketStatus::NotStarted {
                bracket.status = BracketStatus::InProgress;
            }
            Ok(vec![BracketEvent::MatchStarted { match_id }])
        }
        MatchStatus::InProgress => Ok(Vec::new()),
        MatchStatus::Pending => Err(BracketError::MatchNotReady(match_id)),
        MatchStatus::Bye | MatchStatus::Completed => {
            Err(BracketError::MatchAlreadyComplete(match_id))
        }
    }
}

/// Pure form of the engine: `(Bracket, Command) -> (Bracket, Events)`.
pub fn apply_command(
    bracket: &Bracket,
    command: &BracketCommand,
) -> Result<(Bracket, Vec<BracketEvent>), BracketError> {
    let mut next = bracket.clone();
    let events = match *command {
        BracketCommand::StartMatch { match_id } => start_match(&mut next, match_id)?,
        BracketCommand::ReportResult {
            match_id,
            winner_id,
            score_1,
            score_2,
        } => report_result(&mut next, match_id, winner_id, score_1, score_2)?.events,
    };
    Ok((next, events))
}

fn is_same_result(
    m: &GameMatch,
    winner_id: ParticipantId,
    score_1: Option<u32>,
    score_2: Option<u32>,
) -> bool {
    m.winner == Some(winner_id)
        && (score_1.is_none() || score_1 == m.score_1)
        && (score_2.is_none() || score_2 == m.score_2)
}

fn validate_scores(
    winner_slot: Slot,
    score_1: Option<u32>,
    score_2: Option<u32>,
) -> Result<(), BracketError> {
    if let (Some(s1), Some(s2)) = (score_1, score_2) {
        let (winner_score, loser_score) = match winner_slot {
            Slot::One => (s1, s2),
            Slot::Two => (s2, s1),
        };
        if winner_score < loser_score {
            return Err(BracketError::InvalidScore {
                winner_score,
                loser_score,
            });
        }
    }
    Ok(())
}

fn record_result(
    bracket: &mut Bracket,
    position: usize,
    winner_id: ParticipantId,
    loser_id: ParticipantId,
    (score_1, score_2): (Option<u32>, Option<u32>),
    events: &mut Vec<BracketEvent>,
) -> Result<(), BracketError> {
    let winner_was_unbeaten = bracket
        .get_participant(winner_id)
        .ok_or(BracketError::ParticipantNotFound(winner_id))?
        .is_unbeaten();

    let m = &mut bracket.matches[position];
    m.winner = Some(winner_id);
    m.score_1 = score_1;
    m.score_2 = score_2;
    m.status = MatchStatus::Completed;
    let (match_id, stage) = (m.id, m.stage);
    let (winner_placement, loser_placement) = (m.winner_placement, m.loser_placement);
    events.push(BracketEvent::MatchCompleted {
        match_id,
        winner_id,
        loser_id,
    });
    log::debug!("Match {} won by {}", match_id, winner_id);

    if bracket.status == BracketStatus::NotStarted {
        bracket.status = BracketStatus::InProgress;
    }
    participant_mut(bracket, winner_id)?.add_win();
    participant_mut(bracket, loser_id)?.add_loss();

    if stage == Stage::GrandFinal {
        resolve_grand_final(bracket, position, winner_id, loser_id, winner_was_unbeaten, events)?;
    } else {
        if let Some(placement) = winner_placement {
            participant_mut(bracket, winner_id)?.placement = Some(placement);
        }
        if let Some(placement) = loser_placement {
            participant_mut(bracket, loser_id)?.placement = Some(placement);
        }
    }

    propagate(bracket, position, Some(winner_id), Some(loser_id), events)
}

/// The winners champion is the only grand finalist without a loss. If they
/// take the first grand final the bracket is decided; otherwise both meet
/// again in the reset match.
fn resolve_grand_final(
    bracket: &mut Bracket,
    position: usize,
    winner_id: ParticipantId,
    loser_id: ParticipantId,
    winner_was_unbeaten: bool,
    events: &mut Vec<BracketEvent>,
) -> Result<(), BracketError> {
    let (slot_1, slot_2) = {
        let gf = &bracket.matches[position];
        (gf.slot_1, gf.slot_2)
    };
    let Some(reset) = bracket
        .matches
        .iter_mut()
        .find(|m| m.stage == Stage::GrandFinalReset)
    else {
        return Ok(());
    };

    if winner_was_unbeaten {
        reset.status = MatchStatus::Bye;
        events.push(BracketEvent::MatchSkipped { match_id: reset.id });
        participant_mut(bracket, winner_id)?.placement = Some(1);
        participant_mut(bracket, loser_id)?.placement = Some(2);
    } else {
        reset.slot_1 = slot_1;
        reset.slot_2 = slot_2;
        reset.status = MatchStatus::Ready;
        log::info!("Grand finals reset: match {} is now live", reset.id);
        events.push(BracketEvent::BracketReset { match_id: reset.id });
        events.push(BracketEvent::MatchReady { match_id: reset.id });
    }
    Ok(())
}

/// Resolve a PENDING match whose inputs may be settled: READY once both slots
/// are filled, a bye once no feeder is left to fill the remaining slot.
pub(crate) fn settle(
    bracket: &mut Bracket,
    position: usize,
    events: &mut Vec<BracketEvent>,
) -> Result<(), BracketError> {
    let m = &mut bracket.matches[position];
    if m.status != MatchStatus::Pending {
        return Ok(());
    }
    if m.is_populated() {
        m.status = MatchStatus::Ready;
        events.push(BracketEvent::MatchReady { match_id: m.id });
        return Ok(());
    }
    if m.pending_feeders > 0 || m.stage == Stage::GrandFinalReset {
        return Ok(());
    }

    let sole = m.slot_1.or(m.slot_2);
    m.status = MatchStatus::Bye;
    m.winner = sole;
    let (match_id, winner_placement) = (m.id, m.winner_placement);
    events.push(BracketEvent::ByeAwarded {
        match_id,
        participant_id: sole,
    });
    log::debug!("Match {} resolved as a bye", match_id);

    if let (Some(participant), Some(placement)) = (sole, winner_placement) {
        participant_mut(bracket, participant)?.placement = Some(placement);
    }
    propagate(bracket, position, sole, None, events)
}

fn propagate(
    bracket: &mut Bracket,
    position: usize,
    winner: Option<ParticipantId>,
    loser: Option<ParticipantId>,
    events: &mut Vec<BracketEvent>,
) -> Result<(), BracketError> {
    let m = &bracket.matches[position];
    let (next, loser_next) = (m.next_position, m.loser_next_position);
    if let Some(target) = next {
        deliver(bracket, target, winner, events)?;
    }
    if let Some(target) = loser_next {
        deliver(bracket, target, loser, events)?;
    }
    Ok(())
}

/// One feeder of `target` has resolved, sending `participant` (or nobody).
fn deliver(
    bracket: &mut Bracket,
    target: usize,
    participant: Option<ParticipantId>,
    events: &mut Vec<BracketEvent>,
) -> Result<(), BracketError> {
    let m = &mut bracket.matches[target];
    if let Some(participant_id) = participant {
        if m.fill_first_empty_slot(participant_id).is_none() {
            return Err(BracketError::SlotOccupied(m.id));
        }
        events.push(BracketEvent::ParticipantAdvanced {
            match_id: m.id,
            participant_id,
        });
    }
    m.pending_feeders = m.pending_feeders.saturating_sub(1);
    settle(bracket, target, events)
}

fn participant_mut(
    bracket: &mut Bracket,
    id: ParticipantId,
) -> Result<&mut Participant, BracketError> {
    bracket
        .get_participant_mut(id)
        .ok_or(BracketError::ParticipantNotFound(id))
}
