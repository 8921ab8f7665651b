use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::group::Group;

#[derive(Debug, Clone)]
pub(crate) struct NewGroup {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

#[async_trait]
pub(crate) trait GroupRepository: Send + Sync {
    async fn insert(&self, input: NewGroup) -> Result<Group, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError>;
    async fn list_all(&self) -> Result<Vec<Group>, DomainError>;
}
