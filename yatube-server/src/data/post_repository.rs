use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
    pub(crate) image: Option<String>,
    /// `None`: дату проставляет хранилище.
    pub(crate) pub_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
    /// `None`: картинка остаётся прежней.
    pub(crate) image: Option<String>,
}

/// Все списки отдаются от новых к старым (`pub_date DESC, id DESC`).
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn insert(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn find_all(&self) -> Result<Vec<Post>, DomainError>;
    async fn find_by_group(&self, group_id: i64) -> Result<Vec<Post>, DomainError>;
    async fn find_by_author(&self, author_id: i64) -> Result<Vec<Post>, DomainError>;
    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError>;
}
