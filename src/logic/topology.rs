//! Bracket topology: size, byes, round counts and the seed pairing table.

use crate::models::{BracketError, BracketType};
use serde::{Deserialize, Serialize};

/// Largest roster an elimination bracket accepts.
pub const MAX_ELIMINATION_PARTICIPANTS: usize = 256;

/// One first-round pairing. `low_seed` is None when the high seed has a bye.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeedPairing {
    pub high_seed: u32,
    pub low_seed: Option<u32>,
}

impl SeedPairing {
    pub fn is_bye(&self) -> bool {
        self.low_seed.is_none()
    }
}

/// Shape of an elimination bracket for a given roster size.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketTopology {
    pub bracket_type: BracketType,
    pub participant_count: u32,
    pub bracket_size: u32,
    pub bye_count: u32,
    pub winners_rounds: u32,
    pub losers_rounds: u32,
    pub round_count: u32,
    /// First-round pairings in bracket order (top half first).
    pub pairings: Vec<SeedPairing>,
}

impl BracketTopology {
    /// Matches in winners-bracket round `round` (1-based).
    pub fn winners_round_size(&self, round: u32) -> usize {
        (self.bracket_size >> round) as usize
    }

    /// Matches in losers-bracket round `round` (1-based, local to the losers bracket).
    ///
    /// Rounds come in pairs of equal size. Round 1 pairs winners round 1
    /// losers; every even round meets a fresh drop from the winners bracket;
    /// odd rounds after the first pair survivors.
    pub fn losers_round_size(&self, round: u32) -> usize {
        (self.bracket_size >> (round.div_ceil(2) + 1)) as usize
    }
}

/// Compute the topology for `participant_count` entrants.
pub fn build_topology(
    participant_count: usize,
    bracket_type: BracketType,
) -> Result<BracketTopology, BracketError> {
    if !bracket_type.is_elimination() {
        return Err(BracketError::UnsupportedBracketType(bracket_type));
    }
    if participant_count < 2 {
        return Err(BracketError::InvalidRosterSize {
            count: participant_count,
        });
    }
    if participant_count > MAX_ELIMINATION_PARTICIPANTS {
        return Err(BracketError::UnsupportedBracketSize {
            count: participant_count,
            max: MAX_ELIMINATION_PARTICIPANTS,
        });
    }

    let n = participant_count as u32;
    let bracket_size = n.next_power_of_two();
    let winners_rounds = bracket_size.trailing_zeros();
    let (losers_rounds, round_count) = match bracket_type {
        BracketType::DoubleElimination => {
            let losers = (winners_rounds - 1) * 2;
            (losers, winners_rounds + losers + 1)
        }
        _ => (0, winners_rounds),
    };

    Ok(BracketTopology {
        bracket_type,
        participant_count: n,
        bracket_size,
        bye_count: bracket_size - n,
        winners_rounds,
        losers_rounds,
        round_count,
        pairings: seed_pairings(n, bracket_size),
    })
}

/// Seeds in bracket-line order, e.g. size 8 -> [1, 8, 4, 5, 2, 7, 3, 6].
///
/// Each doubling replaces seed `s` with `s` and its mirror `2k + 1 - s`, so
/// seeds 1 and 2 land in opposite halves and can only meet in the final.
pub fn seed_order(bracket_size: u32) -> Vec<u32> {
    let mut order = vec![1];
    let mut size = 1;
    while size < bracket_size {
        size *= 2;
        order = order
            .iter()
            .flat_map(|&s| [s, size + 1 - s])
            .collect();
    }
    order
}

/// Pair seed i with seed (bracket_size + 1 - i); opponents above N are byes,
/// which therefore go to the top seeds first.
pub fn seed_pairings(participant_count: u32, bracket_size: u32) -> Vec<SeedPairing> {
    seed_order(bracket_size)
        .chunks_exact(2)
        .map(|pair| SeedPairing {
            high_seed: pair[0],
            low_seed: (pair[1] <= participant_count).then_some(pair[1]),
        })
        .collect()
}
