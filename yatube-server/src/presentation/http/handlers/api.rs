use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::pagination::Page;
use crate::application::post_service::PostFilter;
use crate::domain::group::{CreateGroupRequest, Group};
use crate::domain::post::Post;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::handlers::PageQuery;
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::views::media_path;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct GroupDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

impl From<Group> for GroupDto {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author: String,
    pub(crate) group: Option<GroupDto>,
    pub(crate) image: Option<String>,
}

impl PostDto {
    fn new(post: Post, media_url: &str) -> Self {
        Self {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: post.author.username,
            group: post.group.map(GroupDto::from),
            image: post.image.map(|image| media_path(media_url, &image)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) num_pages: u32,
    pub(crate) total: usize,
    pub(crate) has_next: bool,
    pub(crate) has_previous: bool,
}

impl PostPageDto {
    fn new(page: Page<Post>, media_url: &str) -> Self {
        Self {
            page: page.number,
            num_pages: page.num_pages,
            total: page.total_items,
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            posts: page
                .items
                .into_iter()
                .map(|post| PostDto::new(post, media_url))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateGroupDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    /// Если не задан, выводится из заголовка.
    #[validate(length(max = 50))]
    pub(crate) slug: Option<String>,
    #[serde(default)]
    pub(crate) description: String,
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Posts listed, newest first", body = PostPageDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    let posts = state.post_service.list_posts(&PostFilter::All).await?;
    let page = state.paginator.paginate(posts, query.number());

    Ok(Json(PostPageDto::new(page, &state.media_url)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostDto>> {
    let id = id.parse::<i64>().map_err(|_| AppError::NotFound)?;
    let post = state.post_service.get_post(id).await?;

    Ok(Json(PostDto::new(post, &state.media_url)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    tag = "groups",
    responses(
        (status = 200, description = "Groups ordered by title", body = [GroupDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_groups(State(state): State<AppState>) -> AppResult<Json<Vec<GroupDto>>> {
    let groups = state.group_service.list_groups().await?;
    Ok(Json(groups.into_iter().map(GroupDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    tag = "groups",
    request_body = CreateGroupDto,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Group created", body = GroupDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_group(
    State(state): State<AppState>,
    AuthenticatedUser(_): AuthenticatedUser,
    Json(dto): Json<CreateGroupDto>,
) -> AppResult<(StatusCode, Json<GroupDto>)> {
    dto.validate()?;

    let req = CreateGroupRequest {
        title: dto.title,
        slug: dto.slug,
        description: dto.description,
    };
    let group = state.group_service.create_group(req).await?;

    Ok((StatusCode::CREATED, Json(GroupDto::from(group))))
}
