use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use serde::Serialize;

use super::AppState;

pub(crate) mod app_error;
pub(crate) mod forms;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;
pub(crate) mod views;

#[cfg(test)]
mod tests;

/// Все маршруты приложения; неизвестный путь отдаёт страницу 404.
pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .merge(routes::router())
        .fallback(handlers::pages::not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::identify_caller,
        ))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}
