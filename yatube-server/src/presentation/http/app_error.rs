use crate::domain::error::DomainError;
use crate::presentation::http::views::{ErrorTemplate, ForbiddenTemplate, NotFoundTemplate};
use askama::Template;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("unauthorized")]
    Unauthorized,

    #[error("template rendering failed")]
    Template(#[from] askama::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub(crate) fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
                DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
                DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                DomainError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                ),
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload too large".to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        }
    }

    fn log_if_server_error(&self, status: StatusCode) {
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        self.log_if_server_error(status);

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

/// Ошибка HTML-страницы: тот же `AppError`, но отдаётся шаблоном, а не JSON.
#[derive(Debug)]
pub(crate) struct PageError(pub(crate) AppError);

pub(crate) type PageResult<T> = Result<T, PageError>;

impl PageError {
    pub(crate) fn not_found() -> Self {
        Self(AppError::NotFound)
    }
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for PageError {
    fn from(err: DomainError) -> Self {
        Self(AppError::Domain(err))
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        Self(AppError::Template(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.status_and_message();
        self.0.log_if_server_error(status);

        let rendered = match status {
            StatusCode::NOT_FOUND => NotFoundTemplate { message }.render(),
            StatusCode::FORBIDDEN => ForbiddenTemplate { message }.render(),
            _ => ErrorTemplate {
                status: status.as_u16(),
                message,
            }
            .render(),
        };

        match rendered {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                error!(error = %err, "error page rendering failed");
                (status, status.canonical_reason().unwrap_or("error")).into_response()
            }
        }
    }
}
