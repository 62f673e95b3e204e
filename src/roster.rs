//! Roster import from CSV: one participant per row, `name` column required,
//! optional `seed` and `id` columns.

use crate::logic::SeedingMethod;
use crate::models::{Participant, ParticipantId};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Could not read roster: {0}")]
    Csv(#[from] csv::Error),
    /// 1-based data row (header excluded).
    #[error("Row {row} has an empty name")]
    EmptyName { row: usize },
    /// Names are unique, case-insensitive.
    #[error("A participant named {0:?} already exists")]
    DuplicateName(String),
}

#[derive(Debug, Deserialize)]
struct RosterRecord {
    name: String,
    #[serde(default)]
    seed: Option<u32>,
    #[serde(default)]
    id: Option<ParticipantId>,
}

/// Participants in registration order, with any seeds the file supplied.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    pub participants: Vec<Participant>,
    pub seeds: Vec<Option<u32>>,
}

impl Roster {
    /// Manual seeding from the file's seed column; blank seeds fall back to
    /// the row's position.
    pub fn manual_seeding(&self) -> SeedingMethod {
        SeedingMethod::Manual(
            self.seeds
                .iter()
                .enumerate()
                .map(|(i, seed)| seed.unwrap_or(i as u32 + 1))
                .collect(),
        )
    }

    /// Whether any row carried a seed.
    pub fn has_seeds(&self) -> bool {
        self.seeds.iter().any(Option::is_some)
    }
}

/// Read a roster from CSV with a header row.
pub fn read_roster<R: Read>(reader: R) -> Result<Roster, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut roster = Roster::default();
    let mut names = HashSet::new();
    for (i, record) in csv_reader.deserialize::<RosterRecord>().enumerate() {
        let record = record?;
        if record.name.is_empty() {
            return Err(RosterError::EmptyName { row: i + 1 });
        }
        if !names.insert(record.name.to_lowercase()) {
            return Err(RosterError::DuplicateName(record.name));
        }
        let participant = match record.id {
            Some(id) => Participant::with_id(id, record.name),
            None => Participant::new(record.name),
        };
        roster.participants.push(participant);
        roster.seeds.push(record.seed);
    }
    log::debug!("Read roster with {} participants", roster.participants.len());
    Ok(roster)
}
