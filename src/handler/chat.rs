use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::chatdb::ChatExt,
    dtos::{
        chatdtos::{
            parse_limit, require_unread_param, ChatListQuery, MarkAsReadDto, MessageDto,
            MessageListQuery, MessageReadDto, SendMessageDto,
        },
        offerdtos::ChatSummaryDto,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    service::error::permission_denied,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/", get(get_my_chats))
        .route("/:chat_id/messages", get(get_messages).post(create_message))
        .route("/messages", get(get_unread_messages))
        .route("/messages/:message_id/mark-as-read", put(mark_message_as_read))
}

pub async fn get_my_chats(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<ChatListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;
    let limit = parse_limit(query.limit.as_deref())?;

    let chats = app_state
        .db_client
        .chats_for_profile(profile.id, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data: Vec<ChatSummaryDto> = chats
        .iter()
        .map(|chat| ChatSummaryDto::from_context(chat, profile.id))
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn get_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<ChatListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;
    let limit = parse_limit(query.limit.as_deref())?;

    let chat = app_state
        .db_client
        .get_chat_context(chat_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Chat not found"))?;

    if !chat.is_participant(profile.id) {
        return Err(permission_denied());
    }

    let messages = app_state
        .db_client
        .messages_for_chat(chat.id, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data: Vec<MessageDto> = messages
        .iter()
        .map(|message| MessageDto::from_message(message, profile.id))
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn create_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let chat = app_state
        .db_client
        .get_chat_context(chat_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Chat not found"))?;

    if !chat.is_participant(profile.id) {
        return Err(permission_denied());
    }

    // The recipient is always the other participant; a sender outside the
    // chat was already rejected above.
    let recipient_id = chat
        .counterpart_of(profile.id)
        .ok_or_else(|| HttpError::bad_request("You are not a member of this chat."))?;

    let message = app_state
        .db_client
        .create_message(chat.id, profile.id, recipient_id, &body.text)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "data": MessageDto::from_message(&message, profile.id)
        })),
    ))
}

pub async fn get_unread_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<MessageListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    require_unread_param(query.unread.as_deref())?;

    let messages = app_state
        .db_client
        .unread_messages_for_profile(profile.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data: Vec<MessageDto> = messages
        .iter()
        .map(|message| MessageDto::from_message(message, profile.id))
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn mark_message_as_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(message_id): Path<Uuid>,
    Json(body): Json<MarkAsReadDto>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    let message = app_state
        .db_client
        .get_message(message_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Message not found"))?;

    let chat = app_state
        .db_client
        .get_chat_context(message.chat_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Chat not found"))?;

    if !chat.is_participant(profile.id) {
        return Err(permission_denied());
    }

    let read_at = body.read_at()?;

    // One bulk write covers the target and everything before it; messages
    // already read keep their original read_at (first write wins).
    app_state
        .db_client
        .mark_read_up_to(chat.id, profile.id, message.sent_at, read_at)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let message = app_state
        .db_client
        .get_message(message_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Message not found"))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": MessageReadDto {
            id: message.id,
            read_at: message.read_at,
        }
    })))
}
