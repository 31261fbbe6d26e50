//! Two-sided match confirmation and the reschedule proposal exchange.
//!
//! Each team of a match has one [`MatchConfirmation`]. A match becomes `confirmed` only when both
//! records are confirmed. Either team may propose another date; the other team accepts it or
//! counter-proposes, for at most [`MAX_RESCHEDULE_ROUNDS`] proposals in total.

use crate::error::LeagueError;
use crate::logic::access::is_league_manager;
use crate::models::{
    ConfirmationStatus, GameMatch, MatchConfirmation, MatchId, MatchStatus, ProfileId, Store,
    TeamId, MAX_RESCHEDULE_ROUNDS,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A new date and time suggested by one team.
#[derive(Clone, Debug, Deserialize)]
pub struct Proposal {
    pub proposed_date: NaiveDate,
    pub proposed_time: Option<NaiveTime>,
    pub message: Option<String>,
}

/// The proposal currently waiting for an answer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OpenProposal {
    pub team_id: TeamId,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_time: Option<NaiveTime>,
    pub message: Option<String>,
    pub round: u8,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConfirmationStatusView {
    pub match_id: MatchId,
    pub match_status: MatchStatus,
    pub team1: MatchConfirmation,
    pub team2: MatchConfirmation,
    pub both_confirmed: bool,
    pub pending_proposal: Option<OpenProposal>,
    pub rounds_used: u8,
    pub rounds_remaining: u8,
}

/// The match, after checking `team` plays in it and the actor may act for that team.
fn acting_for(
    store: &Store,
    actor: ProfileId,
    match_id: MatchId,
    team: TeamId,
) -> Result<GameMatch, LeagueError> {
    let game = store.game(match_id)?.clone();
    if !game.involves(team) {
        return Err(LeagueError::invalid("This team does not play in the match"));
    }
    let plays = store.team(team)?.has_player(actor);
    if !plays && !is_league_manager(store.profile(actor)?, store.league(game.league_id)?) {
        return Err(LeagueError::NotOnTeam);
    }
    if !game.status.is_open() {
        return Err(LeagueError::InvalidMatchState(game.status));
    }
    Ok(game)
}

fn rounds_used(store: &Store, game: &GameMatch) -> u8 {
    [game.team1_id, game.team2_id]
        .iter()
        .filter_map(|&t| store.confirmation(game.id, t))
        .map(|c| c.reschedule_round)
        .max()
        .unwrap_or(0)
}

fn open_proposal(store: &Store, game: &GameMatch) -> Option<OpenProposal> {
    [game.team1_id, game.team2_id]
        .iter()
        .filter_map(|&t| store.confirmation(game.id, t))
        .find(|c| c.has_proposal())
        .map(|c| OpenProposal {
            team_id: c.team_id,
            proposed_date: c.proposed_date,
            proposed_time: c.proposed_time,
            message: c.message.clone(),
            round: c.reschedule_round,
        })
}

fn both_confirmed(store: &Store, game: &GameMatch) -> bool {
    [game.team1_id, game.team2_id]
        .iter()
        .all(|&t| store.confirmation(game.id, t).is_some_and(MatchConfirmation::is_confirmed))
}

/// Set the match status from its two confirmations.
fn sync_match_status(store: &mut Store, match_id: MatchId) -> Result<MatchStatus, LeagueError> {
    let game = store.game(match_id)?.clone();
    let status = if both_confirmed(store, &game) {
        MatchStatus::Confirmed
    } else {
        MatchStatus::Pending
    };
    let stored = store.game_mut(match_id)?;
    if stored.status != status {
        stored.status = status;
        stored.updated_at = Utc::now();
        if status == MatchStatus::Confirmed {
            log::info!("Match {} confirmed by both teams", match_id);
        }
    }
    Ok(status)
}

fn clean_message(message: Option<String>) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Confirm the scheduled date for `team`. The match is confirmed once both teams did.
pub fn confirm_match_for_team(
    store: &mut Store,
    actor: ProfileId,
    match_id: MatchId,
    team: TeamId,
) -> Result<ConfirmationStatusView, LeagueError> {
    let game = acting_for(store, actor, match_id, team)?;
    if !game.is_scheduled() {
        return Err(LeagueError::NotScheduled);
    }
    if open_proposal(store, &game).is_some() {
        return Err(LeagueError::ProposalPending);
    }
    let confirmation = store.confirmation_mut(match_id, team);
    if confirmation.is_confirmed() {
        return Err(LeagueError::AlreadyConfirmed);
    }
    confirmation.status = ConfirmationStatus::Confirmed;
    confirmation.confirmed_by = Some(actor);
    confirmation.updated_at = Utc::now();
    sync_match_status(store, match_id)?;
    match_confirmations_status(store, match_id)
}

fn check_round_available(store: &Store, game: &GameMatch) -> Result<u8, LeagueError> {
    let used = rounds_used(store, game);
    if used >= MAX_RESCHEDULE_ROUNDS {
        return Err(LeagueError::RescheduleLimit {
            max: MAX_RESCHEDULE_ROUNDS,
        });
    }
    Ok(used + 1)
}

fn place_proposal(
    store: &mut Store,
    actor: ProfileId,
    game: &GameMatch,
    team: TeamId,
    proposal: Proposal,
    round: u8,
) -> Result<(), LeagueError> {
    let opponent = game
        .opponent_of(team)
        .ok_or_else(|| LeagueError::invalid("This team does not play in the match"))?;
    store.confirmation_mut(game.id, opponent).reset();

    let own = store.confirmation_mut(game.id, team);
    own.status = ConfirmationStatus::RescheduleProposed;
    own.proposed_date = Some(proposal.proposed_date);
    own.proposed_time = proposal.proposed_time;
    own.message = clean_message(proposal.message);
    own.reschedule_round = round;
    own.confirmed_by = Some(actor);
    own.updated_at = Utc::now();
    sync_match_status(store, game.id)?;
    Ok(())
}

/// Suggest another date. Withdraws both teams' confirmations until the opponent answers.
pub fn propose_reschedule(
    store: &mut Store,
    actor: ProfileId,
    match_id: MatchId,
    team: TeamId,
    proposal: Proposal,
) -> Result<ConfirmationStatusView, LeagueError> {
    let game = acting_for(store, actor, match_id, team)?;
    if open_proposal(store, &game).is_some() {
        return Err(LeagueError::ProposalPending);
    }
    let round = check_round_available(store, &game)?;
    place_proposal(store, actor, &game, team, proposal, round)?;
    log::info!("Reschedule proposed for match {} (round {})", match_id, round);
    match_confirmations_status(store, match_id)
}

/// Answer the opponent's proposal with another date.
pub fn counter_propose_reschedule(
    store: &mut Store,
    actor: ProfileId,
    match_id: MatchId,
    team: TeamId,
    proposal: Proposal,
) -> Result<ConfirmationStatusView, LeagueError> {
    let game = acting_for(store, actor, match_id, team)?;
    match open_proposal(store, &game) {
        Some(open) if open.team_id != team => {}
        Some(_) => return Err(LeagueError::ProposalPending),
        None => return Err(LeagueError::NoProposal),
    }
    let round = check_round_available(store, &game)?;
    place_proposal(store, actor, &game, team, proposal, round)?;
    log::info!("Counter-proposal for match {} (round {})", match_id, round);
    match_confirmations_status(store, match_id)
}

/// Accept the opponent's proposal: it becomes the match date and both teams are confirmed.
pub fn accept_reschedule(
    store: &mut Store,
    actor: ProfileId,
    match_id: MatchId,
    team: TeamId,
) -> Result<ConfirmationStatusView, LeagueError> {
    let game = acting_for(store, actor, match_id, team)?;
    let open = match open_proposal(store, &game) {
        Some(open) if open.team_id != team => open,
        _ => return Err(LeagueError::NoProposal),
    };

    let now = Utc::now();
    for side_team in [game.team1_id, game.team2_id] {
        let confirmation = store.confirmation_mut(match_id, side_team);
        confirmation.status = ConfirmationStatus::Confirmed;
        confirmation.clear_proposal();
        confirmation.updated_at = now;
        if side_team == team {
            confirmation.confirmed_by = Some(actor);
        }
    }
    let stored = store.game_mut(match_id)?;
    stored.scheduled_date = open.proposed_date;
    stored.scheduled_time = open.proposed_time;
    stored.updated_at = now;
    sync_match_status(store, match_id)?;
    log::info!("Reschedule accepted for match {}", match_id);
    match_confirmations_status(store, match_id)
}

/// Both teams' confirmation records and the open proposal, if any.
pub fn match_confirmations_status(
    store: &Store,
    match_id: MatchId,
) -> Result<ConfirmationStatusView, LeagueError> {
    let game = store.game(match_id)?;
    let record = |team| {
        store
            .confirmation(match_id, team)
            .cloned()
            .unwrap_or_else(|| MatchConfirmation::new(match_id, team))
    };
    let used = rounds_used(store, game);
    Ok(ConfirmationStatusView {
        match_id,
        match_status: game.status,
        team1: record(game.team1_id),
        team2: record(game.team2_id),
        both_confirmed: both_confirmed(store, game),
        pending_proposal: open_proposal(store, game),
        rounds_used: used,
        rounds_remaining: MAX_RESCHEDULE_ROUNDS.saturating_sub(used),
    })
}
