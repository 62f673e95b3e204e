//! Bracket business logic: seeding, topology, graph generation, results, completion.

mod completion;
mod generator;
mod results;
mod seeding;
mod setup;
mod topology;

pub use completion::{check_completion, is_complete, refresh_current_round};
pub use generator::{generate_match_graph, MatchBlueprint};
pub use results::{apply_command, report_result, start_match, ResultReport};
pub use seeding::{seed_participants, seed_participants_with_rng, SeedingMethod};
pub use setup::create_bracket;
pub use topology::{
    build_topology, seed_order, seed_pairings, BracketTopology, SeedPairing,
    MAX_ELIMINATION_PARTICIPANTS,
};
