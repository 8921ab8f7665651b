use std::sync::Arc;

use anyhow::{Context, Result};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::group_service::GroupService;
use application::pagination::Paginator;
use application::post_service::PostService;
use data::repositories::postgres::group_repository::PostgresGroupRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::media::FsMediaStore;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let users = Arc::new(PostgresUserRepository::new(pool.clone()));
    let groups = Arc::new(PostgresGroupRepository::new(pool.clone()));
    let posts = Arc::new(PostgresPostRepository::new(pool));
    let media = Arc::new(
        FsMediaStore::new(settings.media_root.clone()).with_context(|| {
            format!("failed to prepare MEDIA_ROOT {}", settings.media_root.display())
        })?,
    );

    let jwt = Arc::new(JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds));
    let auth_service = Arc::new(AuthService::new(users.clone(), Arc::clone(&jwt)));
    let group_service = Arc::new(GroupService::new(groups.clone()));
    let post_service = Arc::new(PostService::new(posts, groups, users, media));

    let state = AppState::new(
        auth_service,
        post_service,
        group_service,
        jwt,
        Paginator::new(settings.posts_per_page),
        &settings.media_url,
    );

    server::run_http(&settings, state).await
}
