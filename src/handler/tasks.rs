use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::taskdb::TaskExt,
    dtos::taskdtos::{CreateTaskDto, TaskWithOffersDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::marketplacemodel::Task,
    service::error::MarketplaceError,
    AppState,
};

pub fn task_handler() -> Router {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/mine", get(tasks_mine))
        .route("/tasks/for-me", get(tasks_for_me))
        .route("/tasks/with-my-offer", get(tasks_with_my_offer))
        .route("/tasks/:task_id", get(retrieve_task))
}

pub async fn create_task(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateTaskDto>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    body.validate_rules(Utc::now()).map_err(HttpError::from)?;

    let service = app_state
        .db_client
        .get_service(body.service)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::from(MarketplaceError::UnknownService(body.service)))?;

    let task = app_state
        .db_client
        .create_task(
            profile.id,
            service.id,
            body.datetime_known,
            &body.datetime_options,
            body.event_type,
            body.address.as_deref(),
            body.price_offer,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .notification_service
        .notify_task_created(&task, &service.name, profile.id)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "data": task
        })),
    ))
}

async fn with_offers(
    app_state: &AppState,
    tasks: Vec<Task>,
) -> Result<Vec<TaskWithOffersDto>, HttpError> {
    let mut result = Vec::with_capacity(tasks.len());

    for task in tasks {
        let offers = app_state
            .db_client
            .offers_for_task(task.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        result.push(TaskWithOffersDto::from_task(&task, &offers));
    }

    Ok(result)
}

pub async fn tasks_mine(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    let tasks = app_state
        .db_client
        .tasks_mine(profile.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data = with_offers(&app_state, tasks).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn tasks_for_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    let tasks = app_state
        .db_client
        .tasks_for_others(profile.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data = with_offers(&app_state, tasks).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn tasks_with_my_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = auth.profile()?;

    let tasks = app_state
        .db_client
        .tasks_with_offer_from(profile.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let data = with_offers(&app_state, tasks).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn retrieve_task(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let task = app_state
        .db_client
        .get_task(task_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::from(MarketplaceError::TaskNotFound(task_id)))?;

    let offers = app_state
        .db_client
        .offers_for_task(task.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": TaskWithOffersDto::from_task(&task, &offers)
    })))
}
