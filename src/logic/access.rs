//! Role checks and the super-admin operations on roles and approvals.

use crate::error::LeagueError;
use crate::models::{League, Profile, ProfileId, Role, Store};

/// Super admins, or league admins a super admin approved.
pub fn require_can_create_league(profile: &Profile) -> Result<(), LeagueError> {
    match profile.role {
        Role::SuperAdmin => Ok(()),
        Role::LeagueAdmin if profile.is_approved => Ok(()),
        Role::LeagueAdmin => Err(LeagueError::AdminNotApproved),
        Role::Player => Err(LeagueError::Forbidden("Only league admins can create leagues")),
    }
}

/// The league's creator or any super admin.
pub fn require_league_manager(profile: &Profile, league: &League) -> Result<(), LeagueError> {
    if profile.is_super_admin() || league.created_by == profile.id {
        Ok(())
    } else {
        Err(LeagueError::Forbidden("Only the league's admins can do this"))
    }
}

pub fn is_league_manager(profile: &Profile, league: &League) -> bool {
    require_league_manager(profile, league).is_ok()
}

pub fn require_super_admin(profile: &Profile) -> Result<(), LeagueError> {
    if profile.is_super_admin() {
        Ok(())
    } else {
        Err(LeagueError::Forbidden("Only super admins can do this"))
    }
}

/// All profiles, newest first (admin dashboard).
pub fn list_profiles(store: &Store, actor: ProfileId) -> Result<Vec<Profile>, LeagueError> {
    require_super_admin(store.profile(actor)?)?;
    let mut profiles = store.profiles.clone();
    profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(profiles)
}

/// League admins still waiting for approval.
pub fn pending_admins(store: &Store, actor: ProfileId) -> Result<Vec<Profile>, LeagueError> {
    require_super_admin(store.profile(actor)?)?;
    Ok(store
        .profiles
        .iter()
        .filter(|p| p.role == Role::LeagueAdmin && !p.is_approved)
        .cloned()
        .collect())
}

/// Change another user's role. A role set by a super admin counts as approved.
pub fn change_role(
    store: &mut Store,
    actor: ProfileId,
    target: ProfileId,
    role: Role,
) -> Result<Profile, LeagueError> {
    require_super_admin(store.profile(actor)?)?;
    if actor == target {
        return Err(LeagueError::CannotChangeOwnRole);
    }
    let profile = store.profile_mut(target)?;
    profile.role = role;
    profile.is_approved = true;
    log::info!("Profile {} is now {}", profile.email, role);
    Ok(profile.clone())
}

/// Approve (or revoke approval of) a league admin.
pub fn set_approval(
    store: &mut Store,
    actor: ProfileId,
    target: ProfileId,
    approved: bool,
) -> Result<Profile, LeagueError> {
    require_super_admin(store.profile(actor)?)?;
    if actor == target {
        return Err(LeagueError::CannotChangeOwnRole);
    }
    let profile = store.profile_mut(target)?;
    if profile.role == Role::Player {
        return Err(LeagueError::invalid("Players do not need approval"));
    }
    profile.is_approved = approved;
    log::info!(
        "Profile {} {}",
        profile.email,
        if approved { "approved" } else { "unapproved" }
    );
    Ok(profile.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(profiles: Vec<Profile>) -> Store {
        let mut store = Store::new();
        store.profiles = profiles;
        store
    }

    #[test]
    fn unapproved_league_admin_cannot_create_leagues() {
        let admin = Profile::new("lea@example.com", "Lea", Role::LeagueAdmin);
        assert!(!admin.is_approved);
        assert_eq!(require_can_create_league(&admin), Err(LeagueError::AdminNotApproved));
    }

    #[test]
    fn players_cannot_create_leagues() {
        let player = Profile::new("pia@example.com", "Pia", Role::Player);
        assert!(matches!(
            require_can_create_league(&player),
            Err(LeagueError::Forbidden(_))
        ));
    }

    #[test]
    fn own_role_change_is_rejected() {
        let boss = Profile::new("boss@example.com", "Boss", Role::SuperAdmin);
        let id = boss.id;
        let mut store = store_with(vec![boss]);
        assert_eq!(
            change_role(&mut store, id, id, Role::Player),
            Err(LeagueError::CannotChangeOwnRole)
        );
        assert_eq!(store.profile(id).unwrap().role, Role::SuperAdmin);
    }

    #[test]
    fn super_admin_promotes_player_to_approved_admin() {
        let boss = Profile::new("boss@example.com", "Boss", Role::SuperAdmin);
        let pia = Profile::new("pia@example.com", "Pia", Role::Player);
        let (boss_id, pia_id) = (boss.id, pia.id);
        let mut store = store_with(vec![boss, pia]);

        let updated = change_role(&mut store, boss_id, pia_id, Role::LeagueAdmin).unwrap();
        assert_eq!(updated.role, Role::LeagueAdmin);
        assert!(updated.can_create_leagues());
    }

    #[test]
    fn only_super_admins_approve() {
        let lea = Profile::new("lea@example.com", "Lea", Role::LeagueAdmin);
        let other = Profile::new("otto@example.com", "Otto", Role::LeagueAdmin);
        let (lea_id, other_id) = (lea.id, other.id);
        let mut store = store_with(vec![lea, other]);
        assert!(matches!(
            set_approval(&mut store, lea_id, other_id, true),
            Err(LeagueError::Forbidden(_))
        ));
    }
}
