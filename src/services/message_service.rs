//! The public message board shown on the timeline.

use async_trait::async_trait;
use tracing::info;

use crate::constants::messages::PER_PAGE;
use crate::db::Store;
use crate::domain::UserId;
use crate::models::message::Message;
use crate::models::user::Actor;
use crate::services::RosterError;
use crate::services::validation::validate_message_text;

#[async_trait]
pub trait MessageService: Send + Sync {
    /// Records a message from the actor and returns the confirmation line.
    async fn post(&self, actor: &Actor, text: &str) -> Result<String, RosterError>;

    /// Latest messages, newest first. `limit` is clamped to one page.
    async fn timeline(&self, limit: Option<u64>) -> Result<Vec<Message>, RosterError>;

    /// How many messages a user has posted, shown on their profile.
    async fn count_by_author(&self, author_id: UserId) -> Result<u64, RosterError>;
}

pub struct SeaOrmMessageService {
    store: Store,
}

impl SeaOrmMessageService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MessageService for SeaOrmMessageService {
    async fn post(&self, actor: &Actor, text: &str) -> Result<String, RosterError> {
        let text = validate_message_text(text)?;
        let id = self
            .store
            .message_repo()
            .add(actor.id, text, chrono::Utc::now().timestamp())
            .await?;

        info!(message_id = id, user_id = %actor.id, "Message posted");
        Ok("Your message was recorded".to_string())
    }

    async fn timeline(&self, limit: Option<u64>) -> Result<Vec<Message>, RosterError> {
        let limit = limit.unwrap_or(PER_PAGE).clamp(1, PER_PAGE);
        Ok(self.store.message_repo().timeline(limit).await?)
    }

    async fn count_by_author(&self, author_id: UserId) -> Result<u64, RosterError> {
        Ok(self.store.message_repo().count_by_author(author_id).await?)
    }
}
