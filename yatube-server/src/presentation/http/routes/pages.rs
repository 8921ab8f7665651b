use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::pages::{
    create_form, create_submit, edit_form, edit_submit, group_posts, index, post_detail, profile,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/create/", get(create_form).post(create_submit))
        .route("/posts/{post_id}/edit/", get(edit_form).post(edit_submit))
}
