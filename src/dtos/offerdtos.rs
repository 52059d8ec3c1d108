use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::chatdb::ChatContextRow;
use crate::models::marketplacemodel::{Offer, OfferStatus};

/// Typed create-offer command. The helper and the initial pending status
/// come from the authenticated context; any status a client sends is
/// simply not part of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOfferDto {
    pub task: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfferDto {
    pub id: Uuid,
    pub task: Uuid,
    pub helper: Uuid,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

impl OfferDto {
    pub fn from_offer(offer: &Offer) -> Self {
        OfferDto {
            id: offer.id,
            task: offer.task_id,
            helper: offer.helper_id,
            status: offer.status,
            created_at: offer.created_at,
        }
    }
}

/// One row of the chat listing: chat identity plus the counterpart's
/// display name from the caller's point of view.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatSummaryDto {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub offer: Uuid,
    pub service: Uuid,
    pub profile_name: Option<String>,
}

impl ChatSummaryDto {
    pub fn from_context(chat: &ChatContextRow, viewer_profile_id: Uuid) -> Self {
        ChatSummaryDto {
            id: chat.id,
            created_at: chat.created_at,
            offer: chat.offer_id,
            service: chat.service_id,
            profile_name: chat.counterpart_name(viewer_profile_id),
        }
    }
}

/// Composite accept response: the transitioned offer plus its chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct OfferWithChatDto {
    pub offer: OfferDto,
    pub chat: ChatSummaryDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(owner_id: Uuid, helper_id: Uuid) -> ChatContextRow {
        ChatContextRow {
            id: Uuid::new_v4(),
            offer_id: Uuid::new_v4(),
            created_at: Utc::now(),
            service_id: Uuid::new_v4(),
            owner_id: Some(owner_id),
            owner_name: Some("Otto".to_string()),
            helper_id,
            helper_name: "Hedda".to_string(),
        }
    }

    #[test]
    fn chat_summary_shows_helper_name_to_owner() {
        let owner = Uuid::new_v4();
        let helper = Uuid::new_v4();
        let chat = context(owner, helper);

        let summary = ChatSummaryDto::from_context(&chat, owner);
        assert_eq!(summary.profile_name, Some("Hedda".to_string()));
        assert_eq!(summary.offer, chat.offer_id);
        assert_eq!(summary.service, chat.service_id);
    }

    #[test]
    fn chat_summary_shows_owner_name_to_helper() {
        let owner = Uuid::new_v4();
        let helper = Uuid::new_v4();
        let chat = context(owner, helper);

        let summary = ChatSummaryDto::from_context(&chat, helper);
        assert_eq!(summary.profile_name, Some("Otto".to_string()));
    }
}
