use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::domain::UserId;
use crate::entities::{messages, users};
use crate::models::message::Message;

pub struct MessageRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> MessageRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn add(&self, author_id: UserId, text: &str, pub_date: i64) -> Result<i32> {
        let active_model = messages::ActiveModel {
            author_id: Set(author_id.value()),
            text: Set(text.to_string()),
            pub_date: Set(pub_date),
            ..Default::default()
        };

        let model = active_model
            .insert(self.conn)
            .await
            .context("Failed to insert message")?;

        Ok(model.id)
    }

    /// Newest first. Messages whose author row is gone are skipped.
    pub async fn timeline(&self, limit: u64) -> Result<Vec<Message>> {
        let rows = messages::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(messages::Column::PubDate)
            .order_by_desc(messages::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await
            .context("Failed to query timeline")?;

        Ok(rows
            .into_iter()
            .filter_map(|(message, author)| {
                let author = author?;
                Some(Message::new(
                    message.id,
                    UserId::new(author.id),
                    author.name,
                    message.text,
                    message.pub_date,
                ))
            })
            .collect())
    }

    pub async fn count_by_author(&self, author_id: UserId) -> Result<u64> {
        messages::Entity::find()
            .filter(messages::Column::AuthorId.eq(author_id.value()))
            .count(self.conn)
            .await
            .context("Failed to count messages")
    }
}
