use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::group_service::GroupService;
use crate::application::pagination::Paginator;
use crate::application::post_service::PostService;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) post_service: Arc<PostService>,
    pub(crate) group_service: Arc<GroupService>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) paginator: Paginator,
    /// Префикс URL медиафайлов, всегда со слешем на конце.
    pub(crate) media_url: Arc<str>,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AuthService>,
        post_service: Arc<PostService>,
        group_service: Arc<GroupService>,
        jwt: Arc<JwtService>,
        paginator: Paginator,
        media_url: &str,
    ) -> Self {
        Self {
            auth_service,
            post_service,
            group_service,
            jwt,
            paginator,
            media_url: Arc::from(media_url),
        }
    }
}
