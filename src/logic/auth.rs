//! Sign-up, sign-in and profile edits.

use crate::error::LeagueError;
use crate::models::{Account, Profile, ProfileId, Role, Store};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Deserialize;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Player or league admin; super admin cannot be requested.
    #[serde(default)]
    pub role: Role,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
}

fn hash_password(password: &str) -> Result<String, LeagueError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LeagueError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(' '),
        None => false,
    }
}

/// A validated registration with the password already hashed, ready to be stored.
///
/// Hashing is deliberately slow, so it happens here, before the store is locked.
#[derive(Clone, Debug)]
pub struct PreparedAccount {
    email: String,
    full_name: String,
    role: Role,
    password_hash: String,
}

/// Validate a registration and hash its password. Does not touch the store.
pub fn prepare_account(new: NewAccount) -> Result<PreparedAccount, LeagueError> {
    let email = new.email.trim().to_lowercase();
    let full_name = new.full_name.trim();
    if !valid_email(&email) {
        return Err(LeagueError::invalid("Please enter a valid email address"));
    }
    if full_name.is_empty() {
        return Err(LeagueError::invalid("Please enter your full name"));
    }
    if new.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LeagueError::invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if new.role == Role::SuperAdmin {
        return Err(LeagueError::Forbidden("The super admin role cannot be requested"));
    }
    Ok(PreparedAccount {
        full_name: full_name.to_string(),
        role: new.role,
        password_hash: hash_password(&new.password)?,
        email,
    })
}

/// Store a prepared account and its profile.
///
/// The account registering with `super_admin_email` becomes an approved super admin; when no such
/// email is configured the very first account does.
pub fn insert_account(
    store: &mut Store,
    prepared: PreparedAccount,
    super_admin_email: Option<&str>,
) -> Result<Profile, LeagueError> {
    if store.account_by_email(&prepared.email).is_some() {
        return Err(LeagueError::DuplicateEmail);
    }
    let bootstrap = match super_admin_email {
        Some(admin) => admin.trim().eq_ignore_ascii_case(&prepared.email),
        None => store.accounts.is_empty(),
    };
    let role = if bootstrap { Role::SuperAdmin } else { prepared.role };

    let profile = Profile::new(prepared.email.clone(), prepared.full_name, role);
    store.accounts.push(Account {
        email: prepared.email,
        password_hash: prepared.password_hash,
        profile_id: profile.id,
    });
    store.profiles.push(profile.clone());
    log::info!("Registered {} as {}", profile.email, profile.role);
    Ok(profile)
}

/// Create an account and its profile in one step.
pub fn register(
    store: &mut Store,
    new: NewAccount,
    super_admin_email: Option<&str>,
) -> Result<Profile, LeagueError> {
    if store.account_by_email(&new.email).is_some() {
        return Err(LeagueError::DuplicateEmail);
    }
    insert_account(store, prepare_account(new)?, super_admin_email)
}

/// Check a password against the account found for `email`. Does not touch the store.
pub fn verify_credentials(
    account: Option<Account>,
    email: &str,
    password: &str,
) -> Result<Account, LeagueError> {
    match account {
        Some(a) if verify_password(password, &a.password_hash) => Ok(a),
        _ => {
            log::warn!("Failed sign-in for {}", email.trim());
            Err(LeagueError::InvalidCredentials)
        }
    }
}

/// Profile of a verified account, creating a player profile if the account has none.
pub fn profile_for_account(store: &mut Store, account: &Account) -> Profile {
    if let Ok(profile) = store.profile(account.profile_id) {
        return profile.clone();
    }
    let name = account
        .email
        .split('@')
        .next()
        .unwrap_or(account.email.as_str())
        .to_string();
    let profile = Profile::with_id(account.profile_id, account.email.clone(), name, Role::Player);
    log::info!("Created missing profile for {}", profile.email);
    store.profiles.push(profile.clone());
    profile
}

/// Check credentials and return the profile in one step.
pub fn sign_in(store: &mut Store, email: &str, password: &str) -> Result<Profile, LeagueError> {
    let account = verify_credentials(store.account_by_email(email).cloned(), email, password)?;
    Ok(profile_for_account(store, &account))
}

pub fn update_profile(
    store: &mut Store,
    actor: ProfileId,
    update: ProfileUpdate,
) -> Result<Profile, LeagueError> {
    let profile = store.profile_mut(actor)?;
    if let Some(name) = update.full_name {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::invalid("Full name cannot be empty"));
        }
        profile.full_name = name.to_string();
    }
    if let Some(phone) = update.phone {
        profile.phone = non_blank(phone);
    }
    if let Some(country) = update.country {
        profile.country = non_blank(country);
    }
    Ok(profile.clone())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Profile id for a session value, checking the profile still exists.
pub fn current_profile(store: &Store, id: Option<Uuid>) -> Result<&Profile, LeagueError> {
    let id = id.ok_or(LeagueError::Unauthenticated)?;
    store.profile(id).map_err(|_| LeagueError::Unauthenticated)
}
