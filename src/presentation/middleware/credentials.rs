use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;

use crate::domain::Credentials;

/// Session cookies of an inbound request.
pub fn credentials_from_headers(headers: &HeaderMap) -> Credentials {
    Credentials::from_cookie_headers(
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok()),
    )
}

/// Prefers credentials rotated by the session guard over the raw cookies.
impl<S> FromRequestParts<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(credentials) = parts.extensions.get::<Credentials>() {
            return Ok(credentials.clone());
        }
        Ok(credentials_from_headers(&parts.headers))
    }
}
