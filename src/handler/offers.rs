use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::offerdb::OfferExt,
    dtos::offerdtos::{ChatSummaryDto, CreateOfferDto, OfferDto, OfferWithChatDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn offer_handler() -> Router {
    Router::new()
        .route("/offers", post(create_offer))
        .route("/offers/mine", get(offers_mine))
        .route("/offers/:offer_id/accept", put(accept_offer))
}

pub async fn create_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    let offer = app_state
        .offer_service
        .create_offer(body.task, profile)
        .await
        .map_err(HttpError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "data": OfferDto::from_offer(&offer)
        })),
    ))
}

pub async fn offers_mine(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    let offers = app_state
        .db_client
        .offers_mine(profile.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data: Vec<OfferDto> = offers.iter().map(OfferDto::from_offer).collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn accept_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(offer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    let accepted = app_state
        .offer_service
        .accept_offer(offer_id, profile)
        .await
        .map_err(HttpError::from)?;

    let response = OfferWithChatDto {
        offer: OfferDto::from_offer(&accepted.offer),
        chat: ChatSummaryDto::from_context(&accepted.chat, profile.id),
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response
    })))
}
