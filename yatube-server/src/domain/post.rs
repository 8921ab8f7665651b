use chrono::{DateTime, Utc};
use imagesize::ImageType;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::group::Group;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Author {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author: Author,
    pub(crate) group: Option<Group>,
    /// Путь к картинке относительно каталога медиафайлов.
    pub(crate) image: Option<String>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        text: impl Into<String>,
        pub_date: DateTime<Utc>,
        author: Author,
        group: Option<Group>,
        image: Option<String>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author.id)?;
        let text = normalize_text(&text.into())?;

        Ok(Self {
            id,
            text,
            pub_date,
            author,
            group,
            image: image.filter(|path| !path.is_empty()),
        })
    }

    pub(crate) fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.id == user_id
    }
}

/// Данные формы создания/редактирования поста.
#[derive(Debug, Clone)]
pub(crate) struct PostInput {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
    pub(crate) image: Option<ImageUpload>,
}

impl PostInput {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(group_id) = self.group_id {
            validate_positive_i64("group", group_id)?;
        }
        Ok(Self {
            text: normalize_text(&self.text)?,
            group_id: self.group_id,
            image: self.image,
        })
    }
}

/// Загруженная картинка, прошедшая проверку формата.
#[derive(Debug, Clone)]
pub(crate) struct ImageUpload {
    pub(crate) file_name: String,
    pub(crate) extension: &'static str,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) bytes: Vec<u8>,
}

impl ImageUpload {
    pub(crate) fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DomainError> {
        let size = imagesize::blob_size(&bytes).map_err(|_| {
            DomainError::validation("image", "upload a valid image file")
        })?;
        if size.width == 0 || size.height == 0 {
            return Err(DomainError::validation("image", "upload a valid image file"));
        }
        let extension = imagesize::image_type(&bytes)
            .map(extension_for)
            .map_err(|_| DomainError::validation("image", "upload a valid image file"))?;

        Ok(Self {
            file_name: file_name.into(),
            extension,
            width: size.width,
            height: size.height,
            bytes,
        })
    }
}

fn extension_for(kind: ImageType) -> &'static str {
    match kind {
        ImageType::Gif => "gif",
        ImageType::Png => "png",
        ImageType::Jpeg => "jpg",
        ImageType::Webp => "webp",
        ImageType::Bmp => "bmp",
        ImageType::Tiff => "tiff",
        ImageType::Ico => "ico",
        _ => "img",
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be > 0"));
    }
    Ok(())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation("text", "must not be empty"));
    }
    Ok(text.to_string())
}

#[cfg(test)]
pub(crate) const TINY_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];
