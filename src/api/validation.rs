use super::ApiError;
use crate::constants::messages::PER_PAGE;
use crate::domain::{TeamId, UserId};

fn validate_positive_id(resource: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_user_id(id: i32) -> Result<UserId, ApiError> {
    validate_positive_id("user", id).map(UserId::new)
}

pub fn validate_team_id(id: i32) -> Result<TeamId, ApiError> {
    validate_positive_id("team", id).map(TeamId::new)
}

pub fn validate_limit(limit: Option<u64>) -> Result<Option<u64>, ApiError> {
    match limit {
        Some(l) if !(1..=PER_PAGE).contains(&l) => Err(ApiError::validation(format!(
            "Invalid limit: {l}. Limit must be between 1 and {PER_PAGE}"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ids() {
        assert_eq!(validate_user_id(1).unwrap(), UserId::new(1));
        assert_eq!(validate_team_id(12345).unwrap(), TeamId::new(12345));
        assert!(validate_user_id(0).is_err());
        assert!(validate_team_id(-1).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None).unwrap(), None);
        assert_eq!(validate_limit(Some(1)).unwrap(), Some(1));
        assert_eq!(validate_limit(Some(30)).unwrap(), Some(30));
        assert!(validate_limit(Some(0)).is_err());
        assert!(validate_limit(Some(31)).is_err());
    }
}
