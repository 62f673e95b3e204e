//! Match graph generation: lays out every match of an elimination bracket as
//! blueprints wired together by position. No ids exist yet; `setup` resolves
//! positions to ids once the whole graph is built.

use crate::logic::topology::BracketTopology;
use crate::models::{BracketError, BracketType, Stage};

/// A match before materialization. Routing refers to positions in the
/// generated list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchBlueprint {
    pub round: u32,
    pub match_number: u32,
    pub stage: Stage,
    /// Seeds placed at creation (first round only).
    pub seeds: [Option<u32>; 2],
    pub next: Option<usize>,
    pub loser_next: Option<usize>,
    pub winner_placement: Option<u32>,
    pub loser_placement: Option<u32>,
}

impl MatchBlueprint {
    fn new(round: u32, match_number: u32, stage: Stage) -> Self {
        Self {
            round,
            match_number,
            stage,
            seeds: [None, None],
            next: None,
            loser_next: None,
            winner_placement: None,
            loser_placement: None,
        }
    }
}

/// Generate the full match graph for `topology`.
///
/// `third_place_match` is honored for single elimination with more than one
/// round; double elimination already decides third place in the losers bracket.
pub fn generate_match_graph(
    topology: &BracketTopology,
    third_place_match: bool,
) -> Result<Vec<MatchBlueprint>, BracketError> {
    match topology.bracket_type {
        BracketType::SingleElimination => Ok(single_elimination(topology, third_place_match)),
        BracketType::DoubleElimination => Ok(double_elimination(topology)),
        other => Err(BracketError::UnsupportedBracketType(other)),
    }
}

/// Winners bracket rounds 1..=winners_rounds. Returns positions per round.
fn winners_bracket(topology: &BracketTopology, graph: &mut Vec<MatchBlueprint>) -> Vec<Vec<usize>> {
    let mut rounds: Vec<Vec<usize>> = Vec::with_capacity(topology.winners_rounds as usize);

    let mut first = Vec::with_capacity(topology.pairings.len());
    for (i, pairing) in topology.pairings.iter().enumerate() {
        let mut m = MatchBlueprint::new(1, i as u32 + 1, Stage::Winners);
        m.seeds = [Some(pairing.high_seed), pairing.low_seed];
        first.push(graph.len());
        graph.push(m);
    }
    rounds.push(first);

    for round in 2..=topology.winners_rounds {
        let size = topology.winners_round_size(round);
        let positions: Vec<usize> = (0..size)
            .map(|i| {
                graph.push(MatchBlueprint::new(round, i as u32 + 1, Stage::Winners));
                graph.len() - 1
            })
            .collect();
        for (i, &from) in rounds[round as usize - 2].iter().enumerate() {
            graph[from].next = Some(positions[i / 2]);
        }
        rounds.push(positions);
    }
    rounds
}

fn single_elimination(topology: &BracketTopology, third_place_match: bool) -> Vec<MatchBlueprint> {
    let mut graph = Vec::with_capacity(topology.bracket_size as usize);
    let rounds = winners_bracket(topology, &mut graph);
    let last = topology.winners_rounds;

    // Losing in round r leaves 2^(last - r) better-placed slots.
    for (r, positions) in rounds.iter().enumerate() {
        let round = r as u32 + 1;
        for &p in positions {
            graph[p].loser_placement = Some((1 << (last - round)) + 1);
        }
    }
    let final_position = rounds[last as usize - 1][0];
    graph[final_position].winner_placement = Some(1);

    if third_place_match && last > 1 {
        let mut third = MatchBlueprint::new(last, 2, Stage::ThirdPlace);
        third.winner_placement = Some(3);
        third.loser_placement = Some(4);
        let third_position = graph.len();
        graph.push(third);
        for &semi in &rounds[last as usize - 2] {
            graph[semi].loser_next = Some(third_position);
            graph[semi].loser_placement = None;
        }
    }

    log::debug!(
        "Generated single elimination graph: {} matches over {} rounds",
        graph.len(),
        last
    );
    graph
}

fn double_elimination(topology: &BracketTopology) -> Vec<MatchBlueprint> {
    let mut graph = Vec::with_capacity(2 * topology.bracket_size as usize);
    let winners = winners_bracket(topology, &mut graph);
    let w = topology.winners_rounds;
    let l = topology.losers_rounds;

    let mut losers: Vec<Vec<usize>> = Vec::with_capacity(l as usize);
    for round in 1..=l {
        let positions: Vec<usize> = (0..topology.losers_round_size(round))
            .map(|i| {
                graph.push(MatchBlueprint::new(w + round, i as u32 + 1, Stage::Losers));
                graph.len() - 1
            })
            .collect();
        losers.push(positions);
    }

    let grand_final_round = w + l + 1;
    let grand_final = graph.len();
    graph.push(MatchBlueprint::new(grand_final_round, 1, Stage::GrandFinal));
    let mut reset = MatchBlueprint::new(grand_final_round, 2, Stage::GrandFinalReset);
    reset.winner_placement = Some(1);
    reset.loser_placement = Some(2);
    graph.push(reset);

    graph[winners[w as usize - 1][0]].next = Some(grand_final);

    // Drops from the winners bracket.
    if l == 0 {
        graph[winners[0][0]].loser_next = Some(grand_final);
    } else {
        for (i, &from) in winners[0].iter().enumerate() {
            graph[from].loser_next = Some(losers[0][i / 2]);
        }
        for round in 2..=w {
            let targets = &losers[2 * (round as usize - 1) - 1];
            let size = targets.len();
            for (i, &from) in winners[round as usize - 1].iter().enumerate() {
                // Alternate drop order so a dropped player avoids a quick rematch.
                let j = if round % 2 == 0 { size - 1 - i } else { i };
                graph[from].loser_next = Some(targets[j]);
            }
        }
    }

    // Advancement inside the losers bracket; each loss there eliminates.
    let mut better_placed = 2;
    for round in (1..=l).rev() {
        let positions = &losers[round as usize - 1];
        for (i, &from) in positions.iter().enumerate() {
            graph[from].loser_placement = Some(better_placed + 1);
            graph[from].next = Some(if round == l {
                grand_final
            } else if round % 2 == 1 {
                losers[round as usize][i]
            } else {
                losers[round as usize][i / 2]
            });
        }
        better_placed += positions.len() as u32;
    }

    log::debug!(
        "Generated double elimination graph: {} matches ({} winners rounds, {} losers rounds)",
        graph.len(),
        w,
        l
    );
    graph
}
