// db/offerdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::Chat;
use crate::models::marketplacemodel::{Assignment, Offer, OfferStatus};

/// Offer joined with the task columns the acceptance workflow needs to
/// authorize and describe the transition.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferContextRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub helper_id: Uuid,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub task_owner_id: Option<Uuid>,
    pub service_id: Uuid,
}

impl OfferContextRow {
    pub fn offer(&self) -> Offer {
        Offer {
            id: self.id,
            task_id: self.task_id,
            helper_id: self.helper_id,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Result of the transactional accept.
#[derive(Debug)]
pub enum AcceptOutcome {
    Accepted {
        offer: Offer,
        assignment: Assignment,
        chat: Chat,
        /// False when the offer was already accepted and this call changed
        /// nothing (idempotent re-accept).
        fresh: bool,
    },
    /// Another offer on the same task already holds accepted status.
    SiblingAlreadyAccepted,
}

#[async_trait]
pub trait OfferExt {
    async fn create_offer(&self, task_id: Uuid, helper_id: Uuid) -> Result<Offer, Error>;

    async fn get_offer_context(&self, offer_id: Uuid) -> Result<Option<OfferContextRow>, Error>;

    async fn helper_has_offer(&self, task_id: Uuid, helper_id: Uuid) -> Result<bool, Error>;

    async fn offers_mine(&self, helper_id: Uuid) -> Result<Vec<Offer>, Error>;

    /// Applies the pending -> accepted transition atomically: the offer row
    /// is locked, the sibling-accepted check runs inside the transaction,
    /// and the assignment and chat are get-or-created. Either every write
    /// lands or none do.
    async fn accept_offer(&self, offer_id: Uuid) -> Result<AcceptOutcome, Error>;
}

#[async_trait]
impl OfferExt for DBClient {
    async fn create_offer(&self, task_id: Uuid, helper_id: Uuid) -> Result<Offer, Error> {
        sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (task_id, helper_id, status)
            VALUES ($1, $2, 'pending')
            RETURNING id, task_id, helper_id, status, created_at
            "#,
        )
        .bind(task_id)
        .bind(helper_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_offer_context(&self, offer_id: Uuid) -> Result<Option<OfferContextRow>, Error> {
        sqlx::query_as::<_, OfferContextRow>(
            r#"
            SELECT o.id, o.task_id, o.helper_id, o.status, o.created_at,
                   t.owner_id AS task_owner_id, t.service_id
            FROM offers o
            INNER JOIN tasks t ON t.id = o.task_id
            WHERE o.id = $1
            "#,
        )
        .bind(offer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn helper_has_offer(&self, task_id: Uuid, helper_id: Uuid) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM offers
                WHERE task_id = $1 AND helper_id = $2
            )
            "#,
        )
        .bind(task_id)
        .bind(helper_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn offers_mine(&self, helper_id: Uuid) -> Result<Vec<Offer>, Error> {
        sqlx::query_as::<_, Offer>(
            r#"
            SELECT id, task_id, helper_id, status, created_at
            FROM offers
            WHERE helper_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(helper_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn accept_offer(&self, offer_id: Uuid) -> Result<AcceptOutcome, Error> {
        let mut tx = self.pool.begin().await?;

        let offer = sqlx::query_as::<_, Offer>(
            r#"
            SELECT id, task_id, helper_id, status, created_at
            FROM offers
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(offer_id)
        .fetch_one(&mut *tx)
        .await?;

        let fresh = offer.status != OfferStatus::Accepted;

        if fresh {
            let sibling_accepted = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM offers
                    WHERE task_id = $1 AND status = 'accepted' AND id != $2
                )
                "#,
            )
            .bind(offer.task_id)
            .bind(offer.id)
            .fetch_one(&mut *tx)
            .await?;

            if sibling_accepted {
                tx.rollback().await?;
                return Ok(AcceptOutcome::SiblingAlreadyAccepted);
            }
        }

        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = 'accepted'
            WHERE id = $1
            RETURNING id, task_id, helper_id, status, created_at
            "#,
        )
        .bind(offer.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO assignments (offer_id)
            VALUES ($1)
            ON CONFLICT (offer_id) DO NOTHING
            "#,
        )
        .bind(offer.id)
        .execute(&mut *tx)
        .await?;

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, offer_id, status, created_at
            FROM assignments
            WHERE offer_id = $1
            "#,
        )
        .bind(offer.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO chats (offer_id)
            VALUES ($1)
            ON CONFLICT (offer_id) DO NOTHING
            "#,
        )
        .bind(offer.id)
        .execute(&mut *tx)
        .await?;

        let chat = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, offer_id, created_at
            FROM chats
            WHERE offer_id = $1
            "#,
        )
        .bind(offer.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AcceptOutcome::Accepted {
            offer,
            assignment,
            chat,
            fresh,
        })
    }
}
