use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::domain::user::Identity;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Вызывающий обязан быть аутентифицирован, иначе 401.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser(pub(crate) Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Вызывающий, если он есть. Анонимный запрос не отклоняется.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser(pub(crate) Option<Identity>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<Identity>().cloned()))
    }
}

/// Определяет вызывающего по bearer-токену или cookie `access_token`.
/// Невалидный токен означает анонимный запрос: решение об отказе принимают экстракторы.
pub(crate) async fn identify_caller(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers())
        .or_else(|| jar.get(ACCESS_TOKEN_COOKIE).map(|cookie| cookie.value().to_string()));

    if let Some(token) = token {
        match state.jwt.identify(&token) {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
            }
            Err(err) => {
                tracing::debug!(error = %err, "ignoring invalid access token");
            }
        }
    }

    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.to_string())
}
