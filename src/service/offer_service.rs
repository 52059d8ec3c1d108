// service/offer_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{
        chatdb::{ChatContextRow, ChatExt},
        db::DBClient,
        offerdb::{AcceptOutcome, OfferExt},
        taskdb::TaskExt,
        userdb::UserExt,
    },
    models::{marketplacemodel::Offer, usermodel::Profile},
    service::{error::MarketplaceError, notification_service::NotificationService},
};

pub struct AcceptedOffer {
    pub offer: Offer,
    pub chat: ChatContextRow,
}

/// Offer lifecycle and the acceptance workflow. All rule checks run before
/// the first mutating write; the accept transition itself is one
/// transaction in the store layer.
#[derive(Debug, Clone)]
pub struct OfferService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl OfferService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    /// Validations run in a fixed order, each with its own error: unknown
    /// task, offering on one's own task, a second offer for the same task,
    /// and a block in either direction.
    pub async fn create_offer(
        &self,
        task_id: Uuid,
        helper: &Profile,
    ) -> Result<Offer, MarketplaceError> {
        let task = self
            .db_client
            .get_task(task_id)
            .await?
            .ok_or(MarketplaceError::UnknownTask(task_id))?;

        if task.owner_id == Some(helper.id) {
            return Err(MarketplaceError::SelfOffer);
        }

        if self.db_client.helper_has_offer(task.id, helper.id).await? {
            return Err(MarketplaceError::DuplicateOffer);
        }

        if let Some(owner_id) = task.owner_id {
            if self.db_client.is_blocked_pair(owner_id, helper.id).await? {
                return Err(MarketplaceError::BlockedPair);
            }
        }

        let offer = self.db_client.create_offer(task.id, helper.id).await?;

        if let Some(owner_id) = task.owner_id {
            let service_name = self
                .db_client
                .get_service(task.service_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_default();

            self.notification_service
                .notify_new_offer(owner_id, &task, &service_name, offer.id)
                .await;
        }

        Ok(offer)
    }

    /// The only state machine in the system: pending -> accepted, by the
    /// task owner, while no sibling offer is accepted. Re-accepting an
    /// already accepted offer returns the same composite result without
    /// writing or notifying again.
    pub async fn accept_offer(
        &self,
        offer_id: Uuid,
        caller: &Profile,
    ) -> Result<AcceptedOffer, MarketplaceError> {
        let context = self
            .db_client
            .get_offer_context(offer_id)
            .await?
            .ok_or(MarketplaceError::OfferNotFound(offer_id))?;

        if context.task_owner_id != Some(caller.id) {
            return Err(MarketplaceError::NotTaskOwner);
        }

        // The offer could vanish between the context read and the locked
        // transaction (profile deletion, block cascade)
        let outcome = self
            .db_client
            .accept_offer(offer_id)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => MarketplaceError::OfferNotFound(offer_id),
                other => MarketplaceError::Database(other),
            })?;

        let (offer, chat, fresh) = match outcome {
            AcceptOutcome::SiblingAlreadyAccepted => {
                return Err(MarketplaceError::SiblingOfferAccepted);
            }
            AcceptOutcome::Accepted {
                offer,
                assignment,
                chat,
                fresh,
            } => {
                if fresh {
                    tracing::info!(
                        "Offer {} accepted; assignment {} and chat {} in place",
                        offer.id,
                        assignment.id,
                        chat.id
                    );
                }
                (offer, chat, fresh)
            }
        };

        let chat_context = self
            .db_client
            .get_chat_context(chat.id)
            .await?
            .ok_or(MarketplaceError::Database(sqlx::Error::RowNotFound))?;

        if fresh {
            self.notification_service
                .notify_offer_accepted(offer.helper_id, chat.id)
                .await;
        }

        Ok(AcceptedOffer {
            offer,
            chat: chat_context,
        })
    }
}
