//! Репозитории в памяти для тестов: одно общее хранилище для пользователей, групп, постов и медиа.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::data::media_store::MediaStore;
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{Author, ImageUpload, Post};
use crate::domain::user::User;

#[derive(Debug, Clone)]
struct PostRecord {
    id: i64,
    author_id: i64,
    text: String,
    group_id: Option<i64>,
    image: Option<String>,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<UserCredentials>,
    groups: Vec<Group>,
    posts: Vec<PostRecord>,
    media: Vec<String>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate(&self, record: &PostRecord) -> Result<Post, DomainError> {
        let author = self
            .users
            .iter()
            .find(|creds| creds.user.id == record.author_id)
            .map(|creds| Author {
                id: creds.user.id,
                username: creds.user.username.clone(),
            })
            .ok_or_else(|| DomainError::not_found("author", record.author_id))?;
        let group = record
            .group_id
            .and_then(|id| self.groups.iter().find(|group| group.id == id).cloned());

        Post::new(
            record.id,
            record.text.clone(),
            record.pub_date,
            author,
            group,
            record.image.clone(),
        )
    }

    fn newest_first<F>(&self, predicate: F) -> Result<Vec<Post>, DomainError>
    where
        F: Fn(&PostRecord) -> bool,
    {
        let mut records: Vec<&PostRecord> = self.posts.iter().filter(|r| predicate(*r)).collect();
        records.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        records.into_iter().map(|r| self.hydrate(r)).collect()
    }

    fn check_group(&self, group_id: Option<i64>) -> Result<(), DomainError> {
        match group_id {
            Some(id) if !self.groups.iter().any(|group| group.id == id) => {
                Err(DomainError::validation("group", "select a valid choice"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store mutex poisoned")
    }

    pub(crate) fn seed_user(&self, username: &str) -> User {
        let mut state = self.lock();
        let id = state.next_id();
        let user = User::new(id, username, Utc::now()).expect("seed user must be valid");
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: String::new(),
        });
        user
    }

    pub(crate) fn seed_group(&self, title: &str, slug: &str, description: &str) -> Group {
        let mut state = self.lock();
        let id = state.next_id();
        let group = Group::new(id, title, slug, description).expect("seed group must be valid");
        state.groups.push(group.clone());
        group
    }

    pub(crate) fn seed_post(
        &self,
        author: &User,
        text: &str,
        group: Option<&Group>,
        pub_date: DateTime<Utc>,
    ) -> Post {
        let mut state = self.lock();
        let id = state.next_id();
        let record = PostRecord {
            id,
            author_id: author.id,
            text: text.to_string(),
            group_id: group.map(|group| group.id),
            image: None,
            pub_date,
        };
        let post = state.hydrate(&record).expect("seed post must be valid");
        state.posts.push(record);
        post
    }

    pub(crate) fn post_count(&self) -> usize {
        self.lock().posts.len()
    }

    pub(crate) fn stored_media(&self) -> Vec<String> {
        self.lock().media.clone()
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        state.check_group(input.group_id)?;
        let id = state.next_id();
        let record = PostRecord {
            id,
            author_id: input.author_id,
            text: input.text,
            group_id: input.group_id,
            image: input.image,
            pub_date: input.pub_date.unwrap_or_else(Utc::now),
        };
        let post = state.hydrate(&record)?;
        state.posts.push(record);
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.lock();
        state
            .posts
            .iter()
            .find(|record| record.id == id)
            .map(|record| state.hydrate(record))
            .transpose()
    }

    async fn update(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        state.check_group(patch.group_id)?;
        let Some(index) = state
            .posts
            .iter()
            .position(|record| record.id == post_id && record.author_id == owner_id)
        else {
            return Ok(None);
        };

        let record = &mut state.posts[index];
        record.text = patch.text;
        record.group_id = patch.group_id;
        if patch.image.is_some() {
            record.image = patch.image;
        }
        let record = record.clone();
        state.hydrate(&record).map(Some)
    }

    async fn find_all(&self) -> Result<Vec<Post>, DomainError> {
        self.lock().newest_first(|_| true)
    }

    async fn find_by_group(&self, group_id: i64) -> Result<Vec<Post>, DomainError> {
        self.lock()
            .newest_first(|record| record.group_id == Some(group_id))
    }

    async fn find_by_author(&self, author_id: i64) -> Result<Vec<Post>, DomainError> {
        self.lock()
            .newest_first(|record| record.author_id == author_id)
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        let count = self
            .lock()
            .posts
            .iter()
            .filter(|record| record.author_id == author_id)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn insert(&self, input: NewGroup) -> Result<Group, DomainError> {
        let mut state = self.lock();
        if state.groups.iter().any(|group| group.slug == input.slug) {
            return Err(DomainError::AlreadyExists("group slug".to_string()));
        }
        let id = state.next_id();
        let group = Group::new(id, input.title, input.slug, input.description)?;
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        Ok(self.lock().groups.iter().find(|group| group.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        Ok(self
            .lock()
            .groups
            .iter()
            .find(|group| group.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, DomainError> {
        let mut groups = self.lock().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|creds| creds.user.username == input.username)
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        let id = state.next_id();
        let user = User::new(id, input.username, Utc::now())?;
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .cloned())
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn store_image(&self, image: &ImageUpload) -> Result<String, DomainError> {
        let mut state = self.lock();
        let path = format!("posts/{}.{}", state.next_id(), image.extension);
        state.media.push(path.clone());
        Ok(path)
    }

    async fn delete_image(&self, stored_path: &str) -> Result<(), DomainError> {
        self.lock().media.retain(|path| path != stored_path);
        Ok(())
    }
}
