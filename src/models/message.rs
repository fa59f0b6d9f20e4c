use chrono::DateTime;
use serde::Serialize;

use crate::domain::UserId;

/// A timeline entry joined with its author's name. The timeline is public, so
/// nothing private about the author is carried.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i32,
    pub author_id: UserId,
    pub author_name: String,
    pub text: String,
    pub pub_date: i64,
    pub published_at: String,
}

impl Message {
    #[must_use]
    pub fn new(
        id: i32,
        author_id: UserId,
        author_name: String,
        text: String,
        pub_date: i64,
    ) -> Self {
        Self {
            id,
            author_id,
            author_name,
            text,
            pub_date,
            published_at: format_pub_date(pub_date),
        }
    }
}

/// Formats a unix timestamp the way the timeline shows it, e.g. `2024-03-01 @ 18:05` (UTC).
#[must_use]
pub fn format_pub_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d @ %H:%M").to_string())
        .unwrap_or_default()
}
