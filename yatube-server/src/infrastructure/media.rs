use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::data::media_store::MediaStore;
use crate::domain::error::DomainError;
use crate::domain::post::ImageUpload;

const POST_IMAGES_DIR: &str = "posts";

/// Хранит загруженные картинки постов в каталоге `MEDIA_ROOT`.
#[derive(Debug, Clone)]
pub(crate) struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub(crate) fn new(root: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(root.join(POST_IMAGES_DIR))?;
        Ok(Self { root })
    }

    fn build_stored_path(image: &ImageUpload) -> String {
        format!("{POST_IMAGES_DIR}/{}.{}", Uuid::new_v4().simple(), image.extension)
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn store_image(&self, image: &ImageUpload) -> Result<String, DomainError> {
        let stored_path = Self::build_stored_path(image);
        let absolute = self.root.join(&stored_path);

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        }
        fs::write(&absolute, &image.bytes)
            .await
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        debug!(
            original = %image.file_name,
            stored = %stored_path,
            width = image.width,
            height = image.height,
            "image stored"
        );
        Ok(stored_path)
    }

    async fn delete_image(&self, stored_path: &str) -> Result<(), DomainError> {
        match fs::remove_file(self.root.join(stored_path)).await {
            Ok(()) => {
                debug!(stored = %stored_path, "image removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(DomainError::Unexpected(err.to_string())),
        }
    }
}
