//! Seeding: order the roster into seed positions 1..N.

use crate::models::{BracketError, Participant};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How seeds are assigned to the roster.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "seeds", rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Seed = registration index + 1.
    #[default]
    RegistrationOrder,
    /// Uniform shuffle, then seeds in shuffled order.
    Random,
    /// Caller-supplied seed per roster position. Missing entries fall back to
    /// the positional seed (index + 1).
    Manual(Vec<u32>),
}

/// Assign seeds using the thread-local rng for `SeedingMethod::Random`.
pub fn seed_participants(
    roster: Vec<Participant>,
    method: &SeedingMethod,
) -> Result<Vec<Participant>, BracketError> {
    seed_participants_with_rng(roster, method, &mut rand::thread_rng())
}

/// Assign seeds 1..N to the roster and return it ordered by seed.
///
/// Manual seeds act as sort keys: ties and gaps are broken by roster position
/// so the result is always dense and unique.
pub fn seed_participants_with_rng<R: Rng + ?Sized>(
    mut roster: Vec<Participant>,
    method: &SeedingMethod,
    rng: &mut R,
) -> Result<Vec<Participant>, BracketError> {
    if roster.len() < 2 {
        return Err(BracketError::InvalidRosterSize {
            count: roster.len(),
        });
    }
    let mut seen = HashSet::with_capacity(roster.len());
    for p in &roster {
        if !seen.insert(p.id) {
            return Err(BracketError::DuplicateParticipant(p.id));
        }
    }

    match method {
        SeedingMethod::RegistrationOrder => {}
        SeedingMethod::Random => roster.shuffle(rng),
        SeedingMethod::Manual(seeds) => {
            let mut keyed: Vec<(u32, usize, Participant)> = roster
                .into_iter()
                .enumerate()
                .map(|(i, p)| {
                    let key = seeds.get(i).copied().unwrap_or(i as u32 + 1);
                    (key, i, p)
                })
                .collect();
            keyed.sort_by_key(|(key, i, _)| (*key, *i));
            roster = keyed.into_iter().map(|(_, _, p)| p).collect();
        }
    }

    for (i, p) in roster.iter_mut().enumerate() {
        p.seed = i as u32 + 1;
    }
    log::debug!("Seeded {} participants ({:?})", roster.len(), method);
    Ok(roster)
}
