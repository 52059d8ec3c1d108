use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{chat::chat_handler, offers::offer_handler, tasks::task_handler, users::users_handler},
    middleware::{auth, idempotency},
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Idempotency runs after auth: the guard keys on the caller's id.
    let marketplace_routes = task_handler()
        .merge(offer_handler())
        .layer(middleware::from_fn(idempotency))
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .nest("/marketplace", marketplace_routes)
        .nest("/chats", chat_handler().layer(middleware::from_fn(auth)))
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_route)
}
