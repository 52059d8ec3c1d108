use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::IntoResponse,
    Extension,
};

use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    db::{idempotency::idempotency_key, userdb::UserExt},
    error::{ErrorMessage, HttpError},
    models::usermodel::{Profile, User},
    utils::token,
    AppState,
};

pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddeware {
    pub user: User,
    pub profile: Option<Profile>,
}

impl JWTAuthMiddeware {
    /// Marketplace and chat actions act on behalf of a profile, not a bare
    /// user account.
    pub fn profile(&self) -> Result<&Profile, HttpError> {
        self.profile
            .as_ref()
            .ok_or_else(|| HttpError::forbidden(ErrorMessage::ProfileRequired.to_str()))
    }
}

pub fn extract_bearer_token(auth_value: &str) -> Option<String> {
    if auth_value.starts_with("Bearer ") {
        Some(auth_value[7..].to_owned())
    } else {
        None
    }
}

pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(extract_bearer_token)
        });

    let token =
        token.ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_str()))?;

    let user_id = match token::decode_token(token, app_state.env.jwt_secret.as_bytes()) {
        Ok(subject) => subject,
        Err(_) => {
            return Err(HttpError::unauthorized(ErrorMessage::InvalidToken.to_str()));
        }
    };

    let user_id = uuid::Uuid::parse_str(&user_id)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_str()))?;

    let user = app_state
        .db_client
        .get_user(user_id)
        .await
        .map_err(|_| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_str()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_str()))?;

    let profile = app_state
        .db_client
        .get_profile_by_user(user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    req.extensions_mut().insert(JWTAuthMiddeware { user, profile });

    Ok(next.run(req).await)
}

/// Rejects a duplicate POST carrying an already-seen idempotency key before
/// any business logic runs. Requests without the header pass through.
pub async fn idempotency(
    Extension(app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    if req.method() != Method::POST {
        return Ok(next.run(req).await);
    }

    let Some(header_key) = req
        .headers()
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
    else {
        return Ok(next.run(req).await);
    };

    let auth = req
        .extensions()
        .get::<JWTAuthMiddeware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_str()))?;

    let key = idempotency_key(auth.user.id, &header_key);
    let ttl = Duration::from_secs(app_state.env.idempotency_ttl_secs);

    if !app_state.idempotency.add(&key, ttl).await {
        tracing::info!("Duplicate request (non-idempotent): key={}", key);
        return Err(HttpError::forbidden("Duplicate request detected."));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(
            extract_bearer_token("Bearer abc.def.ghi"),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn non_bearer_values_are_ignored() {
        assert_eq!(extract_bearer_token("Basic dXNlcg=="), None);
        assert_eq!(extract_bearer_token("abc.def.ghi"), None);
    }
}
