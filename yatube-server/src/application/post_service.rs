use std::sync::Arc;

use tracing::{info, warn};

use crate::data::group_repository::GroupRepository;
use crate::data::media_store::MediaStore;
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostInput};
use crate::domain::user::{Identity, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PostFilter {
    All,
    ByGroup(String),
    ByAuthor(String),
}

pub(crate) struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub(crate) fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            media,
        }
    }

    /// Автор поста всегда берётся из `author`, а не из данных формы.
    pub(crate) async fn create_post(
        &self,
        author: &Identity,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let input = input.validate()?;
        self.ensure_group_exists(input.group_id).await?;
        let image = self.store_image(&input).await?;

        let new_post = NewPost {
            author_id: author.user_id,
            text: input.text,
            group_id: input.group_id,
            image: image.clone(),
            pub_date: None,
        };
        let post = match self.posts.insert(new_post).await {
            Ok(post) => post,
            Err(err) => {
                self.discard_image(image.as_deref()).await;
                return Err(err);
            }
        };

        info!(post_id = post.id, author = %author.username, "post created");
        Ok(post)
    }

    pub(crate) async fn edit_post(
        &self,
        post_id: i64,
        editor: &Identity,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let original = self.get_post(post_id).await?;
        if !original.is_authored_by(editor.user_id) {
            warn!(post_id, editor = %editor.username, "edit rejected for non-author");
            return Err(DomainError::Forbidden);
        }

        let input = input.validate()?;
        self.ensure_group_exists(input.group_id).await?;
        let image = self.store_image(&input).await?;

        let patch = PostPatch {
            text: input.text,
            group_id: input.group_id,
            image: image.clone(),
        };
        let post = match self.posts.update(post_id, editor.user_id, patch).await {
            Ok(Some(post)) => post,
            Ok(None) => {
                self.discard_image(image.as_deref()).await;
                return Err(DomainError::not_found("post", post_id));
            }
            Err(err) => {
                self.discard_image(image.as_deref()).await;
                return Err(err);
            }
        };
        // Новая картинка заменила старую: старый файл больше никто не использует.
        if image.is_some() && original.image != image {
            self.discard_image(original.image.as_deref()).await;
        }

        info!(post_id, editor = %editor.username, "post edited");
        Ok(post)
    }

    pub(crate) async fn get_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    pub(crate) async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        match filter {
            PostFilter::All => self.posts.find_all().await,
            PostFilter::ByGroup(slug) => {
                let group = self
                    .groups
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| DomainError::not_found("group", slug))?;
                self.posts.find_by_group(group.id).await
            }
            PostFilter::ByAuthor(username) => {
                let author = self.get_author(username).await?;
                self.posts.find_by_author(author.id).await
            }
        }
    }

    pub(crate) async fn get_author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .map(|creds| creds.user)
            .ok_or_else(|| DomainError::not_found("user", username))
    }

    pub(crate) async fn author_post_count(&self, author_id: i64) -> Result<i64, DomainError> {
        self.posts.count_by_author(author_id).await
    }

    async fn ensure_group_exists(&self, group_id: Option<i64>) -> Result<(), DomainError> {
        let Some(group_id) = group_id else {
            return Ok(());
        };
        match self.groups.find_by_id(group_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation(
                "group",
                "select a valid choice",
            )),
        }
    }

    async fn store_image(&self, input: &PostInput) -> Result<Option<String>, DomainError> {
        match &input.image {
            Some(image) => self.media.store_image(image).await.map(Some),
            None => Ok(None),
        }
    }

    /// Ошибка удаления только логируется: пост уже записан или запись уже не удалась.
    async fn discard_image(&self, stored_path: Option<&str>) {
        let Some(stored_path) = stored_path else {
            return;
        };
        if let Err(err) = self.media.delete_image(stored_path).await {
            warn!(error = %err, stored = %stored_path, "stored image cleanup failed");
        }
    }
}
