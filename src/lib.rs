//! Tournament bracket engine: builds single/double elimination match graphs
//! from a seeded roster and advances them as results are reported.

pub mod logic;
pub mod models;
pub mod roster;
pub mod service;

pub use logic::{
    apply_command, build_topology, check_completion, create_bracket, generate_match_graph,
    is_complete, report_result, seed_order, seed_pairings, seed_participants,
    seed_participants_with_rng, start_match, BracketTopology, MatchBlueprint, ResultReport,
    SeedPairing, SeedingMethod, MAX_ELIMINATION_PARTICIPANTS,
};
pub use models::{
    Bracket, BracketCommand, BracketError, BracketEvent, BracketId, BracketStatus, BracketType,
    GameMatch, MatchId, MatchStatus, Participant, ParticipantId, Slot, Stage,
};
pub use roster::{read_roster, Roster, RosterError};
pub use service::BracketRegistry;
