// db/taskdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::marketplacemodel::{EventType, OfferStatus, Service, Task};

/// Offer row joined with the helper's public profile, as embedded in task
/// responses.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferWithHelperRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub helper_id: Uuid,
    pub helper_name: String,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait TaskExt {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, Error>;

    async fn create_task(
        &self,
        owner_id: Uuid,
        service_id: Uuid,
        datetime_known: bool,
        datetime_options: &[DateTime<Utc>],
        event_type: EventType,
        address: Option<&str>,
        price_offer: i32,
    ) -> Result<Task, Error>;

    async fn get_task(&self, task_id: Uuid) -> Result<Option<Task>, Error>;

    async fn tasks_mine(&self, owner_id: Uuid) -> Result<Vec<Task>, Error>;

    async fn tasks_for_others(&self, profile_id: Uuid) -> Result<Vec<Task>, Error>;

    async fn tasks_with_offer_from(&self, helper_id: Uuid) -> Result<Vec<Task>, Error>;

    async fn offers_for_task(&self, task_id: Uuid) -> Result<Vec<OfferWithHelperRow>, Error>;
}

#[async_trait]
impl TaskExt for DBClient {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_task(
        &self,
        owner_id: Uuid,
        service_id: Uuid,
        datetime_known: bool,
        datetime_options: &[DateTime<Utc>],
        event_type: EventType,
        address: Option<&str>,
        price_offer: i32,
    ) -> Result<Task, Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (owner_id, service_id, datetime_known, datetime_options,
                 event_type, address, price_offer)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, service_id, datetime_known, datetime_options,
                      event_type, address, price_offer, created_at
            "#,
        )
        .bind(owner_id)
        .bind(service_id)
        .bind(datetime_known)
        .bind(datetime_options)
        .bind(event_type)
        .bind(address)
        .bind(price_offer)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_task(&self, task_id: Uuid) -> Result<Option<Task>, Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, service_id, datetime_known, datetime_options,
                   event_type, address, price_offer, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn tasks_mine(&self, owner_id: Uuid) -> Result<Vec<Task>, Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, service_id, datetime_known, datetime_options,
                   event_type, address, price_offer, created_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn tasks_for_others(&self, profile_id: Uuid) -> Result<Vec<Task>, Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, service_id, datetime_known, datetime_options,
                   event_type, address, price_offer, created_at
            FROM tasks
            WHERE owner_id IS DISTINCT FROM $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn tasks_with_offer_from(&self, helper_id: Uuid) -> Result<Vec<Task>, Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.owner_id, t.service_id, t.datetime_known, t.datetime_options,
                   t.event_type, t.address, t.price_offer, t.created_at
            FROM tasks t
            INNER JOIN offers o ON o.task_id = t.id
            WHERE o.helper_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(helper_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn offers_for_task(&self, task_id: Uuid) -> Result<Vec<OfferWithHelperRow>, Error> {
        sqlx::query_as::<_, OfferWithHelperRow>(
            r#"
            SELECT o.id, o.task_id, o.helper_id, p.name AS helper_name,
                   o.status, o.created_at
            FROM offers o
            INNER JOIN profiles p ON p.id = o.helper_id
            WHERE o.task_id = $1
            ORDER BY o.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
    }
}
