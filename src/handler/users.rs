use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::profiledtos::{CreateProfileDto, ShortProfileDto, UpdateProfileDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/profiles", post(create_profile))
        .route("/profiles/me", get(my_profile).patch(update_my_profile))
        .route("/profiles/:profile_id", get(get_profile).delete(delete_profile))
        .route("/profiles/:profile_id/block", post(block_profile))
}

pub async fn create_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing = app_state
        .db_client
        .get_profile_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::conflict("Profile for this user already exists"));
    }

    let profile = app_state
        .db_client
        .create_profile(auth.user.id, &body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "data": profile
        })),
    ))
}

pub async fn my_profile(
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth
        .profile
        .ok_or_else(|| HttpError::not_found("User doesn't have a profile yet"))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": profile
    })))
}

pub async fn update_my_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile = auth
        .profile
        .as_ref()
        .ok_or_else(|| HttpError::not_found("User doesn't have a profile yet"))?;

    let updated = app_state
        .db_client
        .update_profile(profile.id, &body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": updated
    })))
}

pub async fn get_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state
        .db_client
        .get_profile(profile_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Profile doesn't exist"))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": ShortProfileDto::from_profile(&profile)
    })))
}

pub async fn delete_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state
        .db_client
        .get_profile(profile_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Profile doesn't exist"))?;

    if profile.user_id != auth.user.id {
        return Err(HttpError::bad_request(
            "You can't delete other user's profile",
        ));
    }

    app_state
        .db_client
        .delete_profile(profile.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Profile deleted"
    })))
}

pub async fn block_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let my_profile = auth.profile()?;

    let target = app_state
        .db_client
        .get_profile(profile_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Profile doesn't exist"))?;

    if target.user_id == auth.user.id {
        return Err(HttpError::bad_request("You can't block yourself"));
    }

    let already_blocked = app_state
        .db_client
        .block_exists(my_profile.id, target.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if already_blocked {
        return Err(HttpError::conflict("You already blocked this user"));
    }

    app_state
        .db_client
        .create_block(my_profile.id, target.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Profile blocked"
    })))
}
