// service/push.rs
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum PushError {
    /// The device token is no longer valid; the recipient's token should
    /// be cleared so future sends stop immediately.
    #[error("Device token is unregistered")]
    Unregistered,

    #[error("Push delivery failed: {0}")]
    Http(String),

    #[error("Push transport error: {0}")]
    Transport(String),
}

/// Thin FCM HTTP client. Sending is disabled (every call is a logged
/// no-op) when no server key is configured, so local setups work without
/// Firebase credentials.
#[derive(Debug, Clone)]
pub struct FcmClient {
    client: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

impl FcmClient {
    pub fn new(config: &Config) -> Self {
        FcmClient {
            client: reqwest::Client::new(),
            endpoint: config.fcm_endpoint.clone(),
            server_key: config.fcm_server_key.clone(),
        }
    }

    pub fn build_message(token: &str, title: &str, body: &str, data: Option<&Value>) -> Value {
        let mut message = serde_json::json!({
            "to": token,
            "notification": {
                "title": title,
                "body": body,
            },
        });

        if let Some(data) = data {
            message["data"] = data.clone();
        }

        message
    }

    pub async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<&Value>,
    ) -> Result<(), PushError> {
        let Some(ref server_key) = self.server_key else {
            tracing::debug!("FCM not configured; dropping push notification");
            return Ok(());
        };

        let payload = Self::build_message(token, title, body, data);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", server_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        check_response(status.as_u16(), &response_body)
    }
}

/// Classifies an FCM response: invalid-token answers become
/// `Unregistered`, other failures surface as HTTP errors.
pub fn check_response(status: u16, body: &str) -> Result<(), PushError> {
    if body.contains("NotRegistered")
        || body.contains("InvalidRegistration")
        || body.contains("MismatchSenderId")
    {
        return Err(PushError::Unregistered);
    }

    if status == 404 || status == 410 {
        return Err(PushError::Unregistered);
    }

    if !(200..300).contains(&status) {
        return Err(PushError::Http(format!("status {}: {}", status, body)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_token_notification_and_data() {
        let data = serde_json::json!({"type": "offer_accepted", "chat_id": "abc"});
        let message = FcmClient::build_message("tok-1", "", "Your offer has been accepted!", Some(&data));

        assert_eq!(message["to"], "tok-1");
        assert_eq!(message["notification"]["title"], "");
        assert_eq!(message["notification"]["body"], "Your offer has been accepted!");
        assert_eq!(message["data"]["type"], "offer_accepted");
    }

    #[test]
    fn message_without_data_has_no_data_field() {
        let message = FcmClient::build_message("tok-1", "", "hello", None);
        assert!(message.get("data").is_none());
    }

    #[test]
    fn unregistered_token_is_detected_from_body() {
        let result = check_response(200, r#"{"failure":1,"results":[{"error":"NotRegistered"}]}"#);
        assert!(matches!(result, Err(PushError::Unregistered)));
    }

    #[test]
    fn gone_status_means_unregistered() {
        assert!(matches!(check_response(410, ""), Err(PushError::Unregistered)));
        assert!(matches!(check_response(404, ""), Err(PushError::Unregistered)));
    }

    #[test]
    fn other_failures_are_http_errors() {
        assert!(matches!(check_response(403, "Forbidden"), Err(PushError::Http(_))));
    }

    #[test]
    fn success_passes() {
        assert!(check_response(200, r#"{"success":1}"#).is_ok());
    }
}
