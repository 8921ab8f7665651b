use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::ImageUpload;

#[async_trait]
pub(crate) trait MediaStore: Send + Sync {
    /// Сохраняет картинку и возвращает путь относительно корня медиа.
    async fn store_image(&self, image: &ImageUpload) -> Result<String, DomainError>;

    /// Удаляет ранее сохранённый файл. Отсутствующий файл не считается ошибкой.
    async fn delete_image(&self, stored_path: &str) -> Result<(), DomainError>;
}
