//! Fixtures: round-robin generation, manual scheduling, cancellation and match listings.

use crate::error::LeagueError;
use crate::logic::access::require_league_manager;
use crate::models::{
    pairing, DivisionId, GameMatch, LeagueId, LeagueStatus, MatchConfirmation, MatchId,
    MatchStatus, ProfileId, Store, TeamId,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use std::collections::HashSet;

/// Every unordered pair of `teams` once, in nested-loop order: N*(N-1)/2 pairs.
pub fn round_robin_pairs(teams: &[TeamId]) -> Vec<(TeamId, TeamId)> {
    let mut pairs = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);
    for (i, &home) in teams.iter().enumerate() {
        for &away in &teams[i + 1..] {
            pairs.push((home, away));
        }
    }
    pairs
}

/// Create the missing round-robin matches of a division, each with two pending confirmations.
///
/// Teams are the approved registrations in registration order. Pairs that already have a
/// non-cancelled match are skipped, so generating again never duplicates a fixture.
pub fn generate_division_matches(
    store: &mut Store,
    actor: ProfileId,
    league_id: LeagueId,
    division_id: DivisionId,
) -> Result<Vec<GameMatch>, LeagueError> {
    let league = store.league(league_id)?;
    require_league_manager(store.profile(actor)?, league)?;
    if !matches!(league.status, LeagueStatus::RegistrationOpen | LeagueStatus::Active) {
        return Err(LeagueError::WrongLeagueStatus {
            status: league.status,
            required: "registration_open or active",
        });
    }
    store.division(league_id, division_id)?;

    let teams: Vec<TeamId> = store
        .registrations
        .iter()
        .filter(|r| r.division_id == division_id && r.is_approved())
        .map(|r| r.team_id)
        .collect();
    if teams.len() < 2 {
        return Err(LeagueError::NotEnoughTeams);
    }
    let existing: HashSet<(TeamId, TeamId)> = store
        .matches
        .iter()
        .filter(|m| m.division_id == division_id && m.status != MatchStatus::Cancelled)
        .map(GameMatch::pairing)
        .collect();

    let created: Vec<GameMatch> = round_robin_pairs(&teams)
        .into_iter()
        .filter(|&(a, b)| !existing.contains(&pairing(a, b)))
        .map(|(a, b)| GameMatch::new(league_id, division_id, a, b))
        .collect();
    for game in &created {
        store.confirmations.push(MatchConfirmation::new(game.id, game.team1_id));
        store.confirmations.push(MatchConfirmation::new(game.id, game.team2_id));
    }
    store.matches.extend(created.iter().cloned());
    log::info!(
        "Generated {} matches for division {} ({} teams)",
        created.len(),
        division_id,
        teams.len()
    );
    Ok(created)
}

/// Set date, time and venue of a match. Both teams have to confirm again and the reschedule
/// rounds start over.
pub fn schedule_match(
    store: &mut Store,
    actor: ProfileId,
    match_id: MatchId,
    date: NaiveDate,
    time: Option<NaiveTime>,
    venue: Option<String>,
) -> Result<GameMatch, LeagueError> {
    let game = store.game(match_id)?.clone();
    require_league_manager(store.profile(actor)?, store.league(game.league_id)?)?;
    if !game.status.is_open() {
        return Err(LeagueError::InvalidMatchState(game.status));
    }
    for team in [game.team1_id, game.team2_id] {
        let confirmation = store.confirmation_mut(match_id, team);
        confirmation.reset();
        confirmation.reschedule_round = 0;
    }
    let stored = store.game_mut(match_id)?;
    stored.scheduled_date = Some(date);
    stored.scheduled_time = time;
    stored.venue = venue
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    stored.status = MatchStatus::Pending;
    stored.updated_at = Utc::now();
    Ok(stored.clone())
}

pub fn cancel_match(
    store: &mut Store,
    actor: ProfileId,
    match_id: MatchId,
) -> Result<GameMatch, LeagueError> {
    let game = store.game(match_id)?;
    require_league_manager(store.profile(actor)?, store.league(game.league_id)?)?;
    if !game.status.is_open() {
        return Err(LeagueError::InvalidMatchState(game.status));
    }
    let stored = store.game_mut(match_id)?;
    stored.status = MatchStatus::Cancelled;
    stored.updated_at = Utc::now();
    log::info!("Match {} cancelled", match_id);
    Ok(stored.clone())
}

fn by_date(a: &GameMatch, b: &GameMatch) -> std::cmp::Ordering {
    // Undated matches last.
    (a.scheduled_date.is_none(), a.scheduled_date, a.scheduled_time)
        .cmp(&(b.scheduled_date.is_none(), b.scheduled_date, b.scheduled_time))
}

/// Matches of all teams the actor plays on, earliest first.
pub fn matches_for_player(store: &Store, actor: ProfileId) -> Vec<GameMatch> {
    let teams: HashSet<TeamId> = store
        .teams
        .iter()
        .filter(|t| t.has_player(actor))
        .map(|t| t.id)
        .collect();
    let mut games: Vec<GameMatch> = store
        .matches
        .iter()
        .filter(|m| teams.contains(&m.team1_id) || teams.contains(&m.team2_id))
        .cloned()
        .collect();
    games.sort_by(by_date);
    games
}

pub fn matches_for_league(
    store: &Store,
    league_id: LeagueId,
) -> Result<Vec<GameMatch>, LeagueError> {
    store.league(league_id)?;
    let mut games: Vec<GameMatch> = store
        .matches
        .iter()
        .filter(|m| m.league_id == league_id)
        .cloned()
        .collect();
    games.sort_by(by_date);
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn round_robin_has_every_pair_once() {
        for n in 0..=8usize {
            let teams: Vec<TeamId> = (0..n).map(|_| Uuid::new_v4()).collect();
            let pairs = round_robin_pairs(&teams);
            assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);
            let unique: HashSet<_> = pairs.iter().map(|&(a, b)| pairing(a, b)).collect();
            assert_eq!(unique.len(), pairs.len());
            assert!(pairs.iter().all(|(a, b)| a != b));
        }
    }

    #[test]
    fn round_robin_keeps_given_order() {
        let teams: Vec<TeamId> = (0..3).map(|_| Uuid::new_v4()).collect();
        assert_eq!(
            round_robin_pairs(&teams),
            vec![(teams[0], teams[1]), (teams[0], teams[2]), (teams[1], teams[2])]
        );
    }
}
