//! List users command handler

use crate::state::SharedState;

pub async fn cmd_list_users(state: &SharedState) -> anyhow::Result<()> {
    let users = state.auth_service.list_users().await?;

    if users.is_empty() {
        println!("No users registered yet.");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let team = user
            .team_id
            .map_or_else(|| "-".to_string(), |id| format!("team {id}"));
        let admin = if user.is_admin { " [admin]" } else { "" };

        println!("{:>4}  {}{} <{}>", user.id, user.name, admin, user.email);
        println!("      Shirt: {} | {} | Since {}", user.shirt_size, team, user.created_at);
    }

    Ok(())
}
