use serde::{Deserialize, Serialize};
use slug::slugify;

use super::error::DomainError;

const TITLE_MAX_CHARS: usize = 200;
const SLUG_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Group {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

impl Group {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::validation("id", "must be > 0"));
        }
        let title = normalize_title(&title.into())?;
        let slug = validate_slug(&slug.into())?;

        Ok(Self {
            id,
            title,
            slug,
            description: description.into(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateGroupRequest {
    pub(crate) title: String,
    pub(crate) slug: Option<String>,
    pub(crate) description: String,
}

impl CreateGroupRequest {
    /// Пустой slug выводится из заголовка.
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = normalize_title(&self.title)?;
        let slug = match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => validate_slug(slug)?,
            _ => validate_slug(&slugify(&title))?,
        };

        Ok(Self {
            title,
            slug: Some(slug),
            description: self.description.trim().to_string(),
        })
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::validation("title", "must be 1..200 chars"));
    }
    Ok(title.to_string())
}

fn validate_slug(slug: &str) -> Result<String, DomainError> {
    if slug.is_empty() || slug.len() > SLUG_MAX_CHARS {
        return Err(DomainError::validation("slug", "must be 1..50 chars"));
    }
    if slugify(slug) != slug {
        return Err(DomainError::validation(
            "slug",
            "may contain only lowercase latin letters, digits and hyphens",
        ));
    }
    Ok(slug.to_string())
}
