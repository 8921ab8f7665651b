//! Типизированные модели представления для askama-шаблонов.
//!
//! Каждому маршруту соответствует своя структура шаблона, без словарей контекста.

use askama::Template;

use crate::application::pagination::Page;
use crate::domain::group::Group;
use crate::domain::post::Post;
use crate::presentation::http::forms::PostFormView;

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupLink {
    pub(crate) title: String,
    pub(crate) slug: String,
}

#[derive(Debug, Clone)]
pub(crate) struct PostCard {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) author_username: String,
    pub(crate) pub_date: String,
    pub(crate) group: Option<GroupLink>,
    pub(crate) image_url: Option<String>,
}

impl PostCard {
    pub(crate) fn new(post: Post, media_url: &str) -> Self {
        Self {
            id: post.id,
            text: post.text,
            author_username: post.author.username,
            pub_date: post.pub_date.format(DATE_FORMAT).to_string(),
            group: post.group.map(|group| GroupLink {
                title: group.title,
                slug: group.slug,
            }),
            image_url: post.image.map(|image| media_path(media_url, &image)),
        }
    }
}

pub(crate) fn media_path(media_url: &str, image: &str) -> String {
    format!("{media_url}{image}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageLink {
    pub(crate) number: u32,
    pub(crate) current: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PaginationView {
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) previous: Option<u32>,
    pub(crate) next: Option<u32>,
    pub(crate) links: Vec<PageLink>,
    pub(crate) is_paginated: bool,
}

impl<T> From<&Page<T>> for PaginationView {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            previous: page.previous_page_number(),
            next: page.next_page_number(),
            links: page
                .page_range()
                .map(|number| PageLink {
                    number,
                    current: number == page.number,
                })
                .collect(),
            is_paginated: page.num_pages > 1,
        }
    }
}

/// Страница ленты: карточки постов и навигация по страницам.
#[derive(Debug, Clone)]
pub(crate) struct PostListPage {
    pub(crate) posts: Vec<PostCard>,
    pub(crate) pagination: PaginationView,
}

impl PostListPage {
    pub(crate) fn new(page: Page<Post>, media_url: &str) -> Self {
        let pagination = PaginationView::from(&page);
        Self {
            posts: page
                .items
                .into_iter()
                .map(|post| PostCard::new(post, media_url))
                .collect(),
            pagination,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GroupHeader {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

impl From<Group> for GroupHeader {
    fn from(group: Group) -> Self {
        Self {
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

#[derive(Debug, Template)]
#[template(path = "posts/index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) page: PostListPage,
}

#[derive(Debug, Template)]
#[template(path = "posts/group_list.html")]
pub(crate) struct GroupListTemplate {
    pub(crate) group: GroupHeader,
    pub(crate) page: PostListPage,
}

#[derive(Debug, Template)]
#[template(path = "posts/profile.html")]
pub(crate) struct ProfileTemplate {
    pub(crate) author: String,
    pub(crate) posts_count: i64,
    pub(crate) page: PostListPage,
}

#[derive(Debug, Template)]
#[template(path = "posts/post_detail.html")]
pub(crate) struct PostDetailTemplate {
    pub(crate) post: PostCard,
    pub(crate) author_posts_count: i64,
    pub(crate) can_edit: bool,
}

/// Форма создания и редактирования. `read_only` выставляется, когда страницу
/// редактирования открыл не автор: форма показывается, но без кнопки отправки.
#[derive(Debug, Template)]
#[template(path = "posts/create_post.html")]
pub(crate) struct PostFormTemplate {
    pub(crate) form: PostFormView,
    pub(crate) is_edit: bool,
    pub(crate) read_only: bool,
    pub(crate) action: String,
}

#[derive(Debug, Template)]
#[template(path = "core/404.html")]
pub(crate) struct NotFoundTemplate {
    pub(crate) message: String,
}

#[derive(Debug, Template)]
#[template(path = "core/403.html")]
pub(crate) struct ForbiddenTemplate {
    pub(crate) message: String,
}

#[derive(Debug, Template)]
#[template(path = "core/error.html")]
pub(crate) struct ErrorTemplate {
    pub(crate) status: u16,
    pub(crate) message: String,
}
