//! Teams: creation, renaming, leaving and partner invitations.

use crate::error::LeagueError;
use crate::models::{
    InvitationId, InvitationStatus, ProfileId, Store, Team, TeamId, TeamInvitation,
};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Pending invitations older than this are expired by the cleanup task.
pub const INVITATION_TTL_DAYS: i64 = 14;

const INVITATION_CODE_LEN: usize = 10;

/// What the caller needs to notify the invited player.
#[derive(Clone, Debug)]
pub struct SentInvitation {
    pub invitation: TeamInvitation,
    pub team_name: String,
    pub inviter_name: String,
}

fn clean_name(name: &str) -> Result<&str, LeagueError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LeagueError::invalid("Team name cannot be empty"));
    }
    Ok(name)
}

fn ensure_unique_name(
    store: &Store,
    name: &str,
    except: Option<TeamId>,
) -> Result<(), LeagueError> {
    let taken = store
        .teams
        .iter()
        .any(|t| Some(t.id) != except && t.name.eq_ignore_ascii_case(name));
    if taken {
        Err(LeagueError::DuplicateTeamName)
    } else {
        Ok(())
    }
}

/// Create a team with the actor as first player.
pub fn create_team(store: &mut Store, actor: ProfileId, name: &str) -> Result<Team, LeagueError> {
    store.profile(actor)?;
    let name = clean_name(name)?;
    ensure_unique_name(store, name, None)?;
    let team = Team::new(name, actor);
    log::info!("Team '{}' created", team.name);
    store.teams.push(team.clone());
    Ok(team)
}

pub fn rename_team(
    store: &mut Store,
    actor: ProfileId,
    team_id: TeamId,
    name: &str,
) -> Result<Team, LeagueError> {
    let name = clean_name(name)?;
    if !store.team(team_id)?.has_player(actor) {
        return Err(LeagueError::NotOnTeam);
    }
    ensure_unique_name(store, name, Some(team_id))?;
    let team = store.team_mut(team_id)?;
    team.name = name.to_string();
    Ok(team.clone())
}

/// Leave a team. The second player just leaves; the first player may only leave (dissolving the
/// team) when alone. Not allowed while the team plays in an unfinished league.
///
/// Returns the team after the change, or `None` when it was dissolved.
pub fn leave_team(
    store: &mut Store,
    actor: ProfileId,
    team_id: TeamId,
) -> Result<Option<Team>, LeagueError> {
    let team = store.team(team_id)?.clone();
    if !team.has_player(actor) {
        return Err(LeagueError::NotOnTeam);
    }
    if store.team_in_running_league(team_id) {
        return Err(LeagueError::TeamInLeague);
    }
    let partner = team.other_player(actor);
    if team.player2_id == Some(actor) {
        let team = store.team_mut(team_id)?;
        team.player2_id = None;
        log::info!("Player {} left team '{}'", actor, team.name);
        return Ok(Some(team.clone()));
    }
    if partner.is_some() {
        return Err(LeagueError::Forbidden(
            "The team's creator cannot leave while a partner is on the team",
        ));
    }
    store.teams.retain(|t| t.id != team_id);
    for inv in store.invitations.iter_mut().filter(|i| i.team_id == team_id && i.is_pending()) {
        inv.status = InvitationStatus::Cancelled;
    }
    log::info!("Team '{}' dissolved", team.name);
    Ok(None)
}

/// Teams the actor plays on.
pub fn teams_for(store: &Store, actor: ProfileId) -> Vec<Team> {
    store
        .teams
        .iter()
        .filter(|t| t.has_player(actor))
        .cloned()
        .collect()
}

fn new_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITATION_CODE_LEN)
        .map(char::from)
        .collect()
}

/// Invite a partner by email to an incomplete team.
pub fn invite_player(
    store: &mut Store,
    actor: ProfileId,
    team_id: TeamId,
    email: &str,
) -> Result<SentInvitation, LeagueError> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(LeagueError::invalid("Please enter a valid email address"));
    }
    let inviter = store.profile(actor)?.clone();
    let team = store.team(team_id)?.clone();
    if !team.has_player(actor) {
        return Err(LeagueError::NotOnTeam);
    }
    if team.is_complete() {
        return Err(LeagueError::TeamFull);
    }
    if inviter.has_email(&email) {
        return Err(LeagueError::invalid("You cannot invite yourself"));
    }
    let duplicate = store
        .invitations
        .iter()
        .any(|i| {
            i.team_id == team_id && i.is_pending() && i.invited_email.eq_ignore_ascii_case(&email)
        });
    if duplicate {
        return Err(LeagueError::DuplicateInvitation);
    }

    let invitation = TeamInvitation::new(team_id, email, actor, new_code());
    store.invitations.push(invitation.clone());
    log::info!("Invitation to team '{}' sent to {}", team.name, invitation.invited_email);
    Ok(SentInvitation {
        invitation,
        team_name: team.name,
        inviter_name: inviter.full_name,
    })
}

fn pending_invitation_index(store: &Store, code: &str) -> Result<usize, LeagueError> {
    store
        .invitations
        .iter()
        .position(|i| i.code == code && i.is_pending())
        .ok_or(LeagueError::InvitationNotFound)
}

/// Accept an invitation addressed to the actor's email; the actor becomes the second player.
pub fn accept_invitation(
    store: &mut Store,
    actor: ProfileId,
    code: &str,
) -> Result<Team, LeagueError> {
    let idx = pending_invitation_index(store, code)?;
    let invitation = store.invitations[idx].clone();
    if !store.profile(actor)?.has_email(&invitation.invited_email) {
        return Err(LeagueError::InvitationNotForYou);
    }
    let team = store.team_mut(invitation.team_id)?;
    if team.player1_id == actor {
        return Err(LeagueError::invalid("You are already on this team"));
    }
    if team.is_complete() {
        return Err(LeagueError::TeamFull);
    }
    team.player2_id = Some(actor);
    let team = team.clone();

    store.invitations[idx].status = InvitationStatus::Accepted;
    for other in store
        .invitations
        .iter_mut()
        .filter(|i| i.team_id == team.id && i.is_pending())
    {
        other.status = InvitationStatus::Cancelled;
    }
    log::info!("Team '{}' is complete", team.name);
    Ok(team)
}

pub fn decline_invitation(
    store: &mut Store,
    actor: ProfileId,
    code: &str,
) -> Result<TeamInvitation, LeagueError> {
    let idx = pending_invitation_index(store, code)?;
    if !store.profile(actor)?.has_email(&store.invitations[idx].invited_email) {
        return Err(LeagueError::InvitationNotForYou);
    }
    store.invitations[idx].status = InvitationStatus::Declined;
    Ok(store.invitations[idx].clone())
}

/// Withdraw an invitation; any player of the inviting team may do it.
pub fn cancel_invitation(
    store: &mut Store,
    actor: ProfileId,
    invitation_id: InvitationId,
) -> Result<TeamInvitation, LeagueError> {
    let idx = store
        .invitations
        .iter()
        .position(|i| i.id == invitation_id && i.is_pending())
        .ok_or(LeagueError::InvitationNotFound)?;
    if !store.team(store.invitations[idx].team_id)?.has_player(actor) {
        return Err(LeagueError::NotOnTeam);
    }
    store.invitations[idx].status = InvitationStatus::Cancelled;
    Ok(store.invitations[idx].clone())
}

/// Pending invitations addressed to the actor.
pub fn invitations_for(
    store: &Store,
    actor: ProfileId,
) -> Result<Vec<TeamInvitation>, LeagueError> {
    let profile = store.profile(actor)?;
    Ok(store
        .invitations
        .iter()
        .filter(|i| i.is_pending() && profile.has_email(&i.invited_email))
        .cloned()
        .collect())
}

/// Expire pending invitations older than [`INVITATION_TTL_DAYS`]. Returns how many expired.
pub fn expire_invitations(store: &mut Store, now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::days(INVITATION_TTL_DAYS);
    let mut expired = 0;
    for inv in store
        .invitations
        .iter_mut()
        .filter(|i| i.is_pending() && i.created_at < cutoff)
    {
        inv.status = InvitationStatus::Expired;
        expired += 1;
    }
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, Role};

    fn store_with_two_players() -> (Store, ProfileId, ProfileId) {
        let mut store = Store::new();
        let ana = Profile::new("ana@example.com", "Ana", Role::Player);
        let ben = Profile::new("ben@example.com", "Ben", Role::Player);
        let ids = (ana.id, ben.id);
        store.profiles.extend([ana, ben]);
        (store, ids.0, ids.1)
    }

    #[test]
    fn invitation_completes_team() {
        let (mut store, ana, ben) = store_with_two_players();
        let team = create_team(&mut store, ana, "Smash Bros").unwrap();
        assert!(!team.is_complete());

        let sent = invite_player(&mut store, ana, team.id, "BEN@example.com").unwrap();
        assert_eq!(sent.invitation.code.len(), INVITATION_CODE_LEN);
        assert_eq!(invitations_for(&store, ben).unwrap().len(), 1);

        let team = accept_invitation(&mut store, ben, &sent.invitation.code).unwrap();
        assert_eq!(team.player2_id, Some(ben));
        assert!(invitations_for(&store, ben).unwrap().is_empty());
    }

    #[test]
    fn invitation_for_someone_else_is_rejected() {
        let (mut store, ana, ben) = store_with_two_players();
        let team = create_team(&mut store, ana, "Smash Bros").unwrap();
        let sent = invite_player(&mut store, ana, team.id, "carla@example.com").unwrap();
        assert_eq!(
            accept_invitation(&mut store, ben, &sent.invitation.code).unwrap_err(),
            LeagueError::InvitationNotForYou
        );
    }

    #[test]
    fn duplicate_team_names_are_rejected() {
        let (mut store, ana, ben) = store_with_two_players();
        create_team(&mut store, ana, "Smash Bros").unwrap();
        assert_eq!(
            create_team(&mut store, ben, "smash bros").unwrap_err(),
            LeagueError::DuplicateTeamName
        );
    }

    #[test]
    fn second_player_can_leave_but_creator_cannot_abandon_partner() {
        let (mut store, ana, ben) = store_with_two_players();
        let team = create_team(&mut store, ana, "Smash Bros").unwrap();
        let sent = invite_player(&mut store, ana, team.id, "ben@example.com").unwrap();
        accept_invitation(&mut store, ben, &sent.invitation.code).unwrap();

        assert!(matches!(
            leave_team(&mut store, ana, team.id),
            Err(LeagueError::Forbidden(_))
        ));
        let left = leave_team(&mut store, ben, team.id).unwrap().unwrap();
        assert_eq!(left.player2_id, None);
        assert!(leave_team(&mut store, ana, team.id).unwrap().is_none());
        assert!(store.teams.is_empty());
    }

    #[test]
    fn old_invitations_expire() {
        let (mut store, ana, _) = store_with_two_players();
        let team = create_team(&mut store, ana, "Smash Bros").unwrap();
        invite_player(&mut store, ana, team.id, "ben@example.com").unwrap();
        assert_eq!(expire_invitations(&mut store, Utc::now()), 0);
        let later = Utc::now() + Duration::days(INVITATION_TTL_DAYS + 1);
        assert_eq!(expire_invitations(&mut store, later), 1);
        assert_eq!(store.invitations[0].status, InvitationStatus::Expired);
    }
}
