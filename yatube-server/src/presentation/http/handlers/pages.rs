use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::application::post_service::PostFilter;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::Identity;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{PageError, PageResult};
use crate::presentation::http::handlers::PageQuery;
use crate::presentation::http::forms::{FormErrors, PostFormData, PostFormView};
use crate::presentation::http::middleware::auth::{AuthenticatedUser, CurrentUser};
use crate::presentation::http::views::{
    GroupHeader, GroupListTemplate, IndexTemplate, PostCard, PostDetailTemplate, PostFormTemplate,
    PostListPage, ProfileTemplate, media_path,
};

pub(crate) fn render<T: Template>(template: &T) -> PageResult<Html<String>> {
    Ok(Html(template.render()?))
}

/// 302 Found, как после успешной отправки формы.
pub(crate) fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Некорректный id в пути ведёт себя так же, как несуществующий пост.
fn parse_post_id(raw: &str) -> PageResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(PageError::not_found)
}

async fn list_page(state: &AppState, filter: &PostFilter, page: u32) -> PageResult<PostListPage> {
    let posts = state.post_service.list_posts(filter).await?;
    let page = state.paginator.paginate(posts, page);
    Ok(PostListPage::new(page, &state.media_url))
}

pub(crate) async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> PageResult<Html<String>> {
    let page = list_page(&state, &PostFilter::All, query.number()).await?;
    render(&IndexTemplate { page })
}

pub(crate) async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> PageResult<Html<String>> {
    let group = state.group_service.get_by_slug(&slug).await?;
    let page = list_page(&state, &PostFilter::ByGroup(group.slug.clone()), query.number()).await?;
    render(&GroupListTemplate {
        group: GroupHeader::from(group),
        page,
    })
}

pub(crate) async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> PageResult<Html<String>> {
    let author = state.post_service.get_author(&username).await?;
    let posts_count = state.post_service.author_post_count(author.id).await?;
    let page = list_page(
        &state,
        &PostFilter::ByAuthor(author.username.clone()),
        query.number(),
    )
    .await?;

    render(&ProfileTemplate {
        author: author.username,
        posts_count,
        page,
    })
}

pub(crate) async fn post_detail(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(post_id): Path<String>,
) -> PageResult<Html<String>> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.post_service.get_post(post_id).await?;
    let author_posts_count = state.post_service.author_post_count(post.author.id).await?;
    let can_edit = viewer.is_some_and(|viewer| post.is_authored_by(viewer.user_id));

    render(&PostDetailTemplate {
        post: PostCard::new(post, &state.media_url),
        author_posts_count,
        can_edit,
    })
}

pub(crate) async fn create_form(
    State(state): State<AppState>,
    AuthenticatedUser(_): AuthenticatedUser,
) -> PageResult<Html<String>> {
    let groups = state.group_service.list_groups().await?;
    render(&PostFormTemplate {
        form: PostFormView::blank(&groups),
        is_edit: false,
        read_only: false,
        action: "/create/".to_string(),
    })
}

pub(crate) async fn create_submit(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    mut multipart: Multipart,
) -> PageResult<Response> {
    let form = PostFormData::read(&mut multipart).await?;

    let errors = match form.to_input() {
        Ok(input) => match state.post_service.create_post(&identity, input).await {
            Ok(_) => return Ok(found(profile_location(&identity))),
            Err(err) => FormErrors::from_domain(err)?,
        },
        Err(errors) => errors,
    };

    let groups = state.group_service.list_groups().await?;
    let page = render(&PostFormTemplate {
        form: PostFormView::from_submission(form, errors, &groups, None),
        is_edit: false,
        read_only: false,
        action: "/create/".to_string(),
    })?;
    Ok(page.into_response())
}

pub(crate) async fn edit_form(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(post_id): Path<String>,
) -> PageResult<Html<String>> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.post_service.get_post(post_id).await?;
    let groups = state.group_service.list_groups().await?;

    render(&PostFormTemplate {
        form: PostFormView::for_post(&post, &groups, &state.media_url),
        is_edit: true,
        read_only: !post.is_authored_by(identity.user_id),
        action: edit_location(&post),
    })
}

pub(crate) async fn edit_submit(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(post_id): Path<String>,
    mut multipart: Multipart,
) -> PageResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.post_service.get_post(post_id).await?;
    let form = PostFormData::read(&mut multipart).await?;

    let errors = match form.to_input() {
        Ok(input) => match state.post_service.edit_post(post_id, &identity, input).await {
            Ok(edited) => return Ok(found(format!("/posts/{}/", edited.id))),
            Err(err) => FormErrors::from_domain(err)?,
        },
        // Невалидная форма от не-автора всё равно отклоняется как 403.
        Err(_) if !post.is_authored_by(identity.user_id) => {
            return Err(DomainError::Forbidden.into());
        }
        Err(errors) => errors,
    };

    let groups = state.group_service.list_groups().await?;
    let current_url = post
        .image
        .as_deref()
        .map(|image| media_path(&state.media_url, image));
    let page = render(&PostFormTemplate {
        form: PostFormView::from_submission(form, errors, &groups, current_url),
        is_edit: true,
        read_only: false,
        action: edit_location(&post),
    })?;
    Ok(page.into_response())
}

pub(crate) async fn not_found() -> PageError {
    PageError::not_found()
}

fn profile_location(identity: &Identity) -> String {
    format!("/profile/{}/", identity.username)
}

fn edit_location(post: &Post) -> String {
    format!("/posts/{}/edit/", post.id)
}
