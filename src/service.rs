//! In-memory bracket registry: the library face of CreateBracket / ReportResult.
//!
//! Results for one bracket are serialized by that bracket's mutex; different
//! brackets never contend beyond the short map lookup.

use crate::logic::{self, ResultReport, SeedingMethod};
use crate::models::{
    Bracket, BracketError, BracketEvent, BracketId, BracketStatus, BracketType, MatchId,
    Participant, ParticipantId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Per-bracket entry: bracket data + last activity time (for idle cleanup).
struct BracketEntry {
    bracket: Bracket,
    last_activity: Instant,
}

/// Owns every live bracket by id.
#[derive(Default)]
pub struct BracketRegistry {
    brackets: RwLock<HashMap<BracketId, Arc<Mutex<BracketEntry>>>>,
}

impl BracketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a bracket and start tracking it.
    pub fn create_bracket(
        &self,
        roster: Vec<Participant>,
        bracket_type: BracketType,
        seeding: &SeedingMethod,
        third_place_match: bool,
    ) -> Result<Bracket, BracketError> {
        let bracket = logic::create_bracket(roster, bracket_type, seeding, third_place_match)?;
        let entry = BracketEntry {
            bracket: bracket.clone(),
            last_activity: Instant::now(),
        };
        self.brackets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(bracket.id, Arc::new(Mutex::new(entry)));
        Ok(bracket)
    }

    /// Snapshot of a bracket. Touching it refreshes its activity time.
    pub fn get(&self, id: BracketId) -> Result<Bracket, BracketError> {
        let entry = self.entry(id)?;
        let mut entry = lock(&entry);
        entry.last_activity = Instant::now();
        Ok(entry.bracket.clone())
    }

    pub fn report_result(
        &self,
        id: BracketId,
        match_id: MatchId,
        winner_id: ParticipantId,
        score_1: Option<u32>,
        score_2: Option<u32>,
    ) -> Result<ResultReport, BracketError> {
        let entry = self.entry(id)?;
        let mut entry = lock(&entry);
        entry.last_activity = Instant::now();
        logic::report_result(&mut entry.bracket, match_id, winner_id, score_1, score_2)
    }

    pub fn start_match(
        &self,
        id: BracketId,
        match_id: MatchId,
    ) -> Result<Vec<BracketEvent>, BracketError> {
        let entry = self.entry(id)?;
        let mut entry = lock(&entry);
        entry.last_activity = Instant::now();
        logic::start_match(&mut entry.bracket, match_id)
    }

    /// Drop a bracket (administrative override).
    pub fn remove(&self, id: BracketId) -> Result<(), BracketError> {
        self.brackets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| ())
            .ok_or(BracketError::BracketNotFound(id))
    }

    /// Remove brackets idle for at least `timeout`. Brackets in progress are
    /// never swept; only `remove` drops them. Returns how many were removed.
    pub fn remove_inactive(&self, timeout: Duration) -> usize {
        let mut brackets = self.brackets.write().unwrap_or_else(PoisonError::into_inner);
        let before = brackets.len();
        brackets.retain(|_, entry| {
            let entry = lock(&**entry);
            entry.bracket.status == BracketStatus::InProgress
                || entry.last_activity.elapsed() < timeout
        });
        before - brackets.len()
    }

    pub fn len(&self) -> usize {
        self.brackets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: BracketId) -> Result<Arc<Mutex<BracketEntry>>, BracketError> {
        self.brackets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(BracketError::BracketNotFound(id))
    }
}

// Transitions commit by assignment, so a poisoned guard still holds a
// consistent bracket.
fn lock(entry: &Mutex<BracketEntry>) -> MutexGuard<'_, BracketEntry> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
