use crate::constants::{messages, team};
use crate::domain::ShirtSize;
use crate::services::RosterError;

pub const INVALID_TEAM_NAME: &str = "You have to enter a valid team name";

/// Trims a team name and checks it is non-empty and at most 62 characters.
pub fn validate_team_name(name: &str) -> Result<&str, RosterError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RosterError::validation(INVALID_TEAM_NAME));
    }

    if trimmed.chars().count() > team::MAX_NAME_LEN {
        return Err(RosterError::validation(format!(
            "Team names can be at most {} characters",
            team::MAX_NAME_LEN
        )));
    }

    Ok(trimmed)
}

pub fn validate_shirt_size(size: &str) -> Result<ShirtSize, RosterError> {
    if size.trim().is_empty() {
        return Err(RosterError::validation("You have to select a shirt size"));
    }

    size.parse()
        .map_err(|_| RosterError::validation("You have to select a valid shirt size"))
}

pub fn validate_email(email: &str, allowed_domain: Option<&str>) -> Result<(), RosterError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(RosterError::validation(
            "You have to enter a valid email address",
        ));
    }

    if let Some(domain) = allowed_domain {
        let suffix = format!("@{}", domain.trim_start_matches('@').to_lowercase());
        if !email.to_lowercase().ends_with(&suffix) {
            return Err(RosterError::validation(format!(
                "You have to register with an {suffix} address"
            )));
        }
    }

    Ok(())
}

pub fn validate_message_text(text: &str) -> Result<&str, RosterError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RosterError::validation("A message cannot be empty"));
    }

    if trimmed.chars().count() > messages::MAX_LEN {
        return Err(RosterError::validation(format!(
            "Messages can be at most {} characters",
            messages::MAX_LEN
        )));
    }

    Ok(trimmed)
}
