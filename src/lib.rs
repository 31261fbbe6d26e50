//! Padel league organizer web app: library with models, business logic and the HTTP API.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod logic;
pub mod models;
pub mod notify;

pub use config::Config;
pub use error::LeagueError;
pub use logic::{
    accept_reschedule, confirm_match_for_team, counter_propose_reschedule, evaluate_match,
    generate_division_matches, leaderboard, match_confirmations_status, propose_reschedule,
    record_score, round_robin_pairs, validate_set,
};
pub use models::{
    GameMatch, League, LeagueId, LeagueStatus, MatchFormat, MatchId, MatchStatus, Profile,
    ProfileId, Role, SetScore, Side, Store, Team, TeamId,
};
