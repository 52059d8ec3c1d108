// service/notification_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, userdb::UserExt},
    models::marketplacemodel::Task,
    service::push::{FcmClient, PushError},
};

/// Fire-and-forget push notifications. Nothing here ever fails into the
/// calling request: delivery problems are logged, and a dead device token
/// is cleared from the recipient's profile so the next send skips it.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    fcm: FcmClient,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, fcm: FcmClient) -> Self {
        Self { db_client, fcm }
    }

    /// Broadcast to every profile with a registered device token except the
    /// task owner.
    pub async fn notify_task_created(&self, task: &Task, service_name: &str, owner_id: Uuid) {
        let recipients = match self.db_client.profiles_with_fcm_token(owner_id).await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::error!("Failed to load notification recipients: {}", e);
                return;
            }
        };

        let body = format!("New task has been created: {}", service_name);
        let data = serde_json::json!({
            "type": "new_task",
            "task_id": task.id.to_string(),
        });

        for recipient in recipients {
            self.deliver(recipient.id, recipient.fcm_token.as_deref(), &body, &data)
                .await;
        }
    }

    pub async fn notify_new_offer(&self, owner_id: Uuid, task: &Task, service_name: &str, offer_id: Uuid) {
        let body = format!("New offer for your task: {}", service_name);
        let data = serde_json::json!({
            "type": "new_offer",
            "task_id": task.id.to_string(),
            "offer_id": offer_id.to_string(),
        });

        self.notify_profile(owner_id, &body, &data).await;
    }

    pub async fn notify_offer_accepted(&self, helper_id: Uuid, chat_id: Uuid) {
        let body = "Your offer has been accepted!";
        let data = serde_json::json!({
            "type": "offer_accepted",
            "chat_id": chat_id.to_string(),
        });

        self.notify_profile(helper_id, body, &data).await;
    }

    async fn notify_profile(&self, profile_id: Uuid, body: &str, data: &serde_json::Value) {
        let profile = match self.db_client.get_profile(profile_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Failed to load notification recipient {}: {}", profile_id, e);
                return;
            }
        };

        self.deliver(profile.id, profile.fcm_token.as_deref(), body, data)
            .await;
    }

    async fn deliver(&self, profile_id: Uuid, token: Option<&str>, body: &str, data: &serde_json::Value) {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return;
        };

        match self.fcm.send(token, "", body, Some(data)).await {
            Ok(()) => {
                tracing::debug!("Push notification delivered to profile {}", profile_id);
            }
            Err(PushError::Unregistered) | Err(PushError::Http(_)) => {
                tracing::warn!(
                    "Push delivery to profile {} failed; clearing its device token",
                    profile_id
                );
                if let Err(e) = self.db_client.clear_fcm_token(profile_id).await {
                    tracing::error!("Failed to clear fcm_token for {}: {}", profile_id, e);
                }
            }
            Err(PushError::Transport(e)) => {
                tracing::warn!("Push delivery to profile {} failed in transport: {}", profile_id, e);
            }
        }
    }
}
