//! Bracket creation: seeding -> topology -> match graph -> materialized bracket.

use crate::logic::completion::refresh_current_round;
use crate::logic::generator::{generate_match_graph, MatchBlueprint};
use crate::logic::results::settle;
use crate::logic::seeding::{seed_participants, SeedingMethod};
use crate::logic::topology::{build_topology, BracketTopology};
use crate::models::{
    Bracket, BracketError, BracketStatus, BracketType, GameMatch, MatchId, MatchStatus,
    Participant, Stage,
};
use chrono::Utc;
use uuid::Uuid;

/// Create a bracket from a roster: seed it, build the match graph and resolve
/// first-round byes.
pub fn create_bracket(
    roster: Vec<Participant>,
    bracket_type: BracketType,
    seeding: &SeedingMethod,
    third_place_match: bool,
) -> Result<Bracket, BracketError> {
    let participants = seed_participants(roster, seeding)?;
    build_bracket(participants, bracket_type, third_place_match)
}

/// Build a bracket from participants that already carry seeds 1..N.
fn build_bracket(
    participants: Vec<Participant>,
    bracket_type: BracketType,
    third_place_match: bool,
) -> Result<Bracket, BracketError> {
    let topology = build_topology(participants.len(), bracket_type)?;
    let blueprints = generate_match_graph(&topology, third_place_match)?;
    let matches = materialize(&blueprints, &participants);
    let has_third_place = matches.iter().any(GameMatch::is_third_place);

    let mut bracket = new_bracket(&topology, participants, matches, has_third_place);

    // First-round matches are the only ones without feeders; settling them
    // cascades byes forward.
    let mut events = Vec::new();
    for position in 0..bracket.matches.len() {
        let m = &bracket.matches[position];
        if m.pending_feeders == 0 && m.stage != Stage::GrandFinalReset {
            settle(&mut bracket, position, &mut events)?;
        }
    }
    refresh_current_round(&mut bracket);

    log::info!(
        "Created {} bracket {} ({} participants, {} byes, {} matches)",
        bracket.bracket_type,
        bracket.id,
        topology.participant_count,
        topology.bye_count,
        bracket.matches.len()
    );
    Ok(bracket)
}

fn new_bracket(
    topology: &BracketTopology,
    participants: Vec<Participant>,
    matches: Vec<GameMatch>,
    third_place_match: bool,
) -> Bracket {
    Bracket {
        id: Uuid::new_v4(),
        bracket_type: topology.bracket_type,
        bracket_size: topology.bracket_size,
        winners_rounds: topology.winners_rounds,
        losers_rounds: topology.losers_rounds,
        round_count: topology.round_count,
        current_round: 1,
        third_place_match,
        status: BracketStatus::NotStarted,
        participants,
        matches,
        created_at: Utc::now(),
        completed_at: None,
    }
}

/// Give every blueprint an id, resolve routing positions to ids and place
/// first-round seeds.
fn materialize(blueprints: &[MatchBlueprint], participants: &[Participant]) -> Vec<GameMatch> {
    let ids: Vec<MatchId> = blueprints.iter().map(|_| Uuid::new_v4()).collect();

    let mut feeders = vec![0u8; blueprints.len()];
    for b in blueprints {
        for target in [b.next, b.loser_next].into_iter().flatten() {
            feeders[target] += 1;
        }
    }

    let participant_for = |seed: Option<u32>| {
        seed.and_then(|s| participants.iter().find(|p| p.seed == s))
            .map(|p| p.id)
    };

    blueprints
        .iter()
        .enumerate()
        .map(|(position, b)| GameMatch {
            id: ids[position],
            round: b.round,
            match_number: b.match_number,
            position,
            stage: b.stage,
            slot_1: participant_for(b.seeds[0]),
            slot_2: participant_for(b.seeds[1]),
            winner: None,
            score_1: None,
            score_2: None,
            status: MatchStatus::Pending,
            next_match: b.next.map(|p| ids[p]),
            loser_next_match: b.loser_next.map(|p| ids[p]),
            next_position: b.next,
            loser_next_position: b.loser_next,
            pending_feeders: feeders[position],
            winner_placement: b.winner_placement,
            loser_placement: b.loser_placement,
        })
        .collect()
}
