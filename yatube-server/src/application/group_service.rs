use std::sync::Arc;

use tracing::info;

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::domain::error::DomainError;
use crate::domain::group::{CreateGroupRequest, Group};

pub(crate) struct GroupService {
    repo: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub(crate) fn new(repo: Arc<dyn GroupRepository>) -> Self {
        Self { repo }
    }

    pub(crate) async fn get_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))
    }

    pub(crate) async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        self.repo.list_all().await
    }

    pub(crate) async fn create_group(&self, req: CreateGroupRequest) -> Result<Group, DomainError> {
        let req = req.validate()?;
        let slug = req
            .slug
            .ok_or_else(|| DomainError::Unexpected("validated group has no slug".to_string()))?;

        let group = self
            .repo
            .insert(NewGroup {
                title: req.title,
                slug,
                description: req.description,
            })
            .await?;

        info!(group_id = group.id, slug = %group.slug, "group created");
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::GroupService;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::error::DomainError;
    use crate::domain::group::CreateGroupRequest;

    #[tokio::test]
    async fn create_group_derives_slug_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let service = GroupService::new(Arc::new(store));

        let group = service
            .create_group(CreateGroupRequest {
                title: "Rust Notes".to_string(),
                slug: None,
                description: "about rust".to_string(),
            })
            .await
            .expect("group must be created");
        assert_eq!(group.slug, "rust-notes");

        let err = service
            .create_group(CreateGroupRequest {
                title: "Other".to_string(),
                slug: Some("rust-notes".to_string()),
                description: String::new(),
            })
            .await
            .expect_err("duplicate slug must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn get_by_slug_and_list_groups() {
        let store = MemoryStore::new();
        store.seed_group("Тест группа", "test-slug", "Тест описание");
        store.seed_group("Алгоритмы", "algo", "");
        let service = GroupService::new(Arc::new(store));

        let group = service
            .get_by_slug("test-slug")
            .await
            .expect("group must exist");
        assert_eq!(group.title, "Тест группа");

        let err = service
            .get_by_slug("unknown")
            .await
            .expect_err("unknown slug must fail");
        assert!(matches!(err, DomainError::NotFound { resource: "group", .. }));

        let titles: Vec<String> = service
            .list_groups()
            .await
            .expect("list must succeed")
            .into_iter()
            .map(|group| group.title)
            .collect();
        assert_eq!(titles, vec!["Алгоритмы".to_string(), "Тест группа".to_string()]);
    }
}
