//! Site administration commands

use crate::domain::UserId;
use crate::models::user::Actor;
use crate::state::SharedState;

pub async fn cmd_promote(state: &SharedState, email: &str) -> anyhow::Result<()> {
    state.auth_service.promote(email).await?;
    println!("✓ {email} is now a site administrator");
    Ok(())
}

pub async fn cmd_delete_user(state: &SharedState, id: i32) -> anyhow::Result<()> {
    let message = state
        .auth_service
        .delete_user(&Actor::operator(), UserId::new(id))
        .await?;
    println!("✓ {message}");
    Ok(())
}
