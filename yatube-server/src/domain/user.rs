use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            return Err(DomainError::validation("password", "must be 8..128 chars"));
        }
        Ok(Self {
            username,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > USERNAME_MAX_CHARS {
            return Err(DomainError::validation("username", "must be 1..150 chars"));
        }

        if self.password.is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::validation("id", "must be > 0"));
        }
        let username = normalize_username(&username.into())?;

        Ok(Self {
            id,
            username,
            created_at,
        })
    }
}

/// Аутентифицированный пользователь, от имени которого выполняется запрос.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation("username", "must be 3..150 chars"));
    }
    let allowed = username
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'));
    if !allowed {
        return Err(DomainError::validation(
            "username",
            "may contain only latin letters, digits and @/./+/-/_",
        ));
    }
    Ok(username.to_string())
}
