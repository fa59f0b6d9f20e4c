//! List teams command handler

use crate::state::SharedState;

pub async fn cmd_list_teams(state: &SharedState) -> anyhow::Result<()> {
    let teams = state.team_service.list().await?;

    if teams.is_empty() {
        println!("No teams yet.");
        return Ok(());
    }

    println!("Teams ({} total)", teams.len());
    println!("{:-<70}", "");

    for summary in teams {
        let detail = state.team_service.detail(summary.team.id).await?;
        let hardware = if summary.team.hardware { " [hardware]" } else { "" };
        let full = if summary.is_full { " FULL" } else { "" };

        println!(
            "{:>4}  {}{} ({}/{}){}",
            summary.team.id,
            summary.team.name,
            hardware,
            summary.member_count,
            summary.capacity,
            full
        );
        for member in detail.members {
            let marker = if member.is_team_admin { "*" } else { " " };
            println!("      {marker} {} (#{})", member.name, member.id);
        }
    }

    println!();
    println!("* team admin");

    Ok(())
}
