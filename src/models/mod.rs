//! Data structures for the padel league and the store holding them.

mod confirmation;
mod game;
mod league;
mod profile;
mod registration;
mod store;
mod team;

pub(crate) use game::pairing;

pub use confirmation::{ConfirmationStatus, MatchConfirmation, MAX_RESCHEDULE_ROUNDS};
pub use game::{GameMatch, MatchId, MatchStatus, SetScore, Side};
pub use league::{Division, DivisionId, League, LeagueId, LeagueStatus, MatchFormat};
pub use profile::{Account, Profile, ProfileId, Role};
pub use registration::{LeagueRegistration, RegistrationId, RegistrationStatus};
pub use store::Store;
pub use team::{InvitationId, InvitationStatus, Team, TeamId, TeamInvitation};
