mod admin;
mod teams;
mod users;

pub use admin::{cmd_delete_user, cmd_promote};
pub use teams::cmd_list_teams;
pub use users::cmd_list_users;
