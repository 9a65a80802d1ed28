//! Request extractors shared by the taskboard endpoints.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::ports::ClientIdentity;

/// Header carrying the identity of the client that sent a mutation.
pub const FROM_ID_HEADER: &str = "taskboard-from-id";

/// Identity of the requesting client, if it sent one.
///
/// Missing, blank, or non-UTF-8 headers all yield `None`; the change is
/// then broadcast to every session.
#[derive(Debug, Clone, Default)]
pub struct Origin(pub Option<ClientIdentity>);

impl Origin {
    pub fn identity(&self) -> Option<&ClientIdentity> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Origin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(FROM_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        Ok(Origin(ClientIdentity::parse(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn origin_of(request: Request<()>) -> Origin {
        let (mut parts, _) = request.into_parts();
        Origin::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn reads_identity_header() {
        let request = Request::builder()
            .header(FROM_ID_HEADER, "client-a")
            .body(())
            .unwrap();
        let origin = origin_of(request).await;
        assert_eq!(origin.identity().map(ClientIdentity::as_str), Some("client-a"));
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_anonymous() {
        assert!(origin_of(Request::builder().body(()).unwrap()).await.0.is_none());

        let blank = Request::builder()
            .header(FROM_ID_HEADER, "  ")
            .body(())
            .unwrap();
        assert!(origin_of(blank).await.0.is_none());
    }
}
