// db/chatdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::Message;

/// Chat joined with its offer, task and both participants. One row carries
/// everything needed for participant checks, counterpart naming and
/// recipient inference.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatContextRow {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub service_id: Uuid,
    pub owner_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub helper_id: Uuid,
    pub helper_name: String,
}

impl ChatContextRow {
    pub fn is_participant(&self, profile_id: Uuid) -> bool {
        self.owner_id == Some(profile_id) || self.helper_id == profile_id
    }

    /// The other participant, for recipient inference. None when the given
    /// profile is not part of the chat.
    pub fn counterpart_of(&self, profile_id: Uuid) -> Option<Uuid> {
        if self.owner_id == Some(profile_id) {
            Some(self.helper_id)
        } else if self.helper_id == profile_id {
            self.owner_id
        } else {
            None
        }
    }

    /// The other participant's display name, as shown in chat listings.
    pub fn counterpart_name(&self, profile_id: Uuid) -> Option<String> {
        if self.owner_id == Some(profile_id) {
            Some(self.helper_name.clone())
        } else {
            self.owner_name.clone()
        }
    }
}

#[async_trait]
pub trait ChatExt {
    async fn get_chat_context(&self, chat_id: Uuid) -> Result<Option<ChatContextRow>, Error>;

    /// All chats where the profile is the task owner or the offer helper.
    async fn chats_for_profile(
        &self,
        profile_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ChatContextRow>, Error>;

    async fn create_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        text: &str,
    ) -> Result<Message, Error>;

    async fn messages_for_chat(
        &self,
        chat_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, Error>;

    async fn get_message(&self, message_id: Uuid) -> Result<Option<Message>, Error>;

    /// Unread messages addressed to the profile across all of its chats.
    async fn unread_messages_for_profile(&self, profile_id: Uuid) -> Result<Vec<Message>, Error>;

    /// Marks the target and every earlier still-unread message in the chat
    /// not authored by the reader as read, in one statement. Messages with
    /// a read_at already set keep it (first write wins).
    async fn mark_read_up_to(
        &self,
        chat_id: Uuid,
        reader_id: Uuid,
        target_sent_at: DateTime<Utc>,
        read_at: DateTime<Utc>,
    ) -> Result<u64, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn get_chat_context(&self, chat_id: Uuid) -> Result<Option<ChatContextRow>, Error> {
        sqlx::query_as::<_, ChatContextRow>(
            r#"
            SELECT c.id, c.offer_id, c.created_at, t.service_id,
                   t.owner_id AS owner_id, po.name AS owner_name,
                   o.helper_id AS helper_id, ph.name AS helper_name
            FROM chats c
            INNER JOIN offers o ON o.id = c.offer_id
            INNER JOIN tasks t ON t.id = o.task_id
            INNER JOIN profiles ph ON ph.id = o.helper_id
            LEFT JOIN profiles po ON po.id = t.owner_id
            WHERE c.id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn chats_for_profile(
        &self,
        profile_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ChatContextRow>, Error> {
        sqlx::query_as::<_, ChatContextRow>(
            r#"
            SELECT c.id, c.offer_id, c.created_at, t.service_id,
                   t.owner_id AS owner_id, po.name AS owner_name,
                   o.helper_id AS helper_id, ph.name AS helper_name
            FROM chats c
            INNER JOIN offers o ON o.id = c.offer_id
            INNER JOIN tasks t ON t.id = o.task_id
            INNER JOIN profiles ph ON ph.id = o.helper_id
            LEFT JOIN profiles po ON po.id = t.owner_id
            WHERE o.helper_id = $1 OR t.owner_id = $1
            ORDER BY c.created_at ASC
            LIMIT $2
            "#,
        )
        .bind(profile_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        text: &str,
    ) -> Result<Message, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (chat_id, sender_id, recipient_id, text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, chat_id, sender_id, recipient_id, sent_at, read_at,
                      text, created_at
            "#,
        )
        .bind(chat_id)
        .bind(sender_id)
        .bind(recipient_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
    }

    async fn messages_for_chat(
        &self,
        chat_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, sender_id, recipient_id, sent_at, read_at,
                   text, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_message(&self, message_id: Uuid) -> Result<Option<Message>, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, sender_id, recipient_id, sent_at, read_at,
                   text, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn unread_messages_for_profile(&self, profile_id: Uuid) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, sender_id, recipient_id, sent_at, read_at,
                   text, created_at
            FROM messages
            WHERE recipient_id = $1
              AND read_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_read_up_to(
        &self,
        chat_id: Uuid,
        reader_id: Uuid,
        target_sent_at: DateTime<Utc>,
        read_at: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = $4
            WHERE chat_id = $1
              AND sender_id != $2
              AND read_at IS NULL
              AND sent_at <= $3
            "#,
        )
        .bind(chat_id)
        .bind(reader_id)
        .bind(target_sent_at)
        .bind(read_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(owner_id: Option<Uuid>, helper_id: Uuid) -> ChatContextRow {
        ChatContextRow {
            id: Uuid::new_v4(),
            offer_id: Uuid::new_v4(),
            created_at: Utc::now(),
            service_id: Uuid::new_v4(),
            owner_id,
            owner_name: owner_id.map(|_| "Olga".to_string()),
            helper_id,
            helper_name: "Hanna".to_string(),
        }
    }

    #[test]
    fn counterpart_of_owner_is_helper() {
        let owner = Uuid::new_v4();
        let helper = Uuid::new_v4();
        let chat = context(Some(owner), helper);

        assert_eq!(chat.counterpart_of(owner), Some(helper));
        assert_eq!(chat.counterpart_of(helper), Some(owner));
    }

    #[test]
    fn counterpart_of_stranger_is_none() {
        let chat = context(Some(Uuid::new_v4()), Uuid::new_v4());

        assert_eq!(chat.counterpart_of(Uuid::new_v4()), None);
    }

    #[test]
    fn counterpart_name_picks_the_other_side() {
        let owner = Uuid::new_v4();
        let helper = Uuid::new_v4();
        let chat = context(Some(owner), helper);

        assert_eq!(chat.counterpart_name(owner), Some("Hanna".to_string()));
        assert_eq!(chat.counterpart_name(helper), Some("Olga".to_string()));
    }

    #[test]
    fn participant_check_covers_both_sides() {
        let owner = Uuid::new_v4();
        let helper = Uuid::new_v4();
        let chat = context(Some(owner), helper);

        assert!(chat.is_participant(owner));
        assert!(chat.is_participant(helper));
        assert!(!chat.is_participant(Uuid::new_v4()));
    }

    #[test]
    fn helper_cannot_reach_deleted_owner() {
        let helper = Uuid::new_v4();
        let chat = context(None, helper);

        assert!(chat.is_participant(helper));
        assert_eq!(chat.counterpart_of(helper), None);
        assert_eq!(chat.counterpart_name(helper), None);
    }
}
