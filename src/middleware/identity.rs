use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::error::AppError;

/// Header carrying the identity-provider subject of the caller
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller, as asserted by the identity gateway in front of the
/// API
///
/// Extracting `Caller` rejects with `401` when the header is absent; use
/// `Option<Caller>` on routes that also serve anonymous readers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    pub fn id(&self) -> &str {
        &self.0
    }
}

fn caller_from_headers(headers: &HeaderMap) -> Option<Caller> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| Caller(id.to_string()))
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers).ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_caller_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" auth0|abc "));
        assert_eq!(caller_from_headers(&headers), Some(Caller("auth0|abc".to_string())));
    }

    #[test]
    fn test_missing_or_blank_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(caller_from_headers(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(caller_from_headers(&headers), None);
    }
}
