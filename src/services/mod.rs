pub mod error;
pub use error::RosterError;

pub mod membership;
pub use membership::MembershipLock;

pub mod validation;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod team_service;
pub mod team_service_impl;
pub use team_service::{TeamOutcome, TeamRegistration, TeamService};
pub use team_service_impl::SeaOrmTeamService;

pub mod message_service;
pub use message_service::{MessageService, SeaOrmMessageService};
