use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::api::{create_group, get_post, list_groups, list_posts};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
        .route("/groups", get(list_groups).post(create_group))
}
