//! League business logic, one module per concern. Handlers call these with the store locked.

pub mod access;
pub mod auth;
pub mod confirmation;
pub mod leagues;
pub mod schedule;
pub mod scoring;
pub mod standings;
pub mod teams;

pub use confirmation::{
    accept_reschedule, confirm_match_for_team, counter_propose_reschedule,
    match_confirmations_status, propose_reschedule,
};
pub use schedule::{generate_division_matches, round_robin_pairs};
pub use scoring::{evaluate_match, record_score, validate_set, MatchOutcome};
pub use standings::{leaderboard, recompute_division, sort_standings, Leaderboard, StandingRow};
