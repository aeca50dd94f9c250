//! Session lookup shared by every protected page and endpoint.

use async_trait::async_trait;
use axum::extract::{FromRequest, RequestParts};
use axum::headers::authorization::Bearer;
use axum::headers::{Authorization, Cookie, HeaderMapExt};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;

use crate::backend::Backend;
use crate::models::Parent;
use crate::{AppState, Error};

pub const SESSION_COOKIE: &str = "ssid";

/// Session id from the `ssid` cookie, falling back to an `Authorization: Bearer` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_owned))
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|auth| auth.token().to_owned())
                .filter(|token| !token.is_empty())
        })
}

pub async fn current_parent(
    backend: &dyn Backend,
    headers: &HeaderMap,
) -> Result<Option<Parent>, Error> {
    match session_token(headers) {
        Some(ssid) => backend.current_user(&ssid).await,
        None => Ok(None),
    }
}

/// Extractor guarding a page: yields the signed-in parent or redirects to the login page.
#[derive(Debug, Clone)]
pub struct RequireParent(pub Parent);

#[async_trait]
impl<B> FromRequest<B> for RequireParent
where
    B: Send,
{
    type Rejection = Response;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Extension(state) = Extension::<AppState>::from_request(req)
            .await
            .map_err(IntoResponse::into_response)?;

        match current_parent(state.backend.as_ref(), req.headers()).await {
            Ok(Some(parent)) => Ok(RequireParent(parent)),
            Ok(None) => Err(Redirect::to("/").into_response()),
            Err(err) => {
                log::warn!("Session lookup failed: {}", err);
                Err(Redirect::to("/").into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};
    use axum::http::HeaderValue;

    #[test]
    fn token_comes_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; ssid=abc123"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn token_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn empty_cookie_is_no_session() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("ssid="));
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn empty_cookie_does_not_hide_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("ssid="));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }
}
