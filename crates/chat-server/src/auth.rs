//! Identity handed over by the fronting identity provider.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use crate::error::ServerError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The signed-in user.
///
/// Extraction fails with 401 when either identity header is missing or
/// empty, before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match (header(parts, USER_ID_HEADER), header(parts, USER_EMAIL_HEADER)) {
            (Some(id), Some(email)) => Ok(AuthUser { id, email }),
            _ => {
                debug!(path = %parts.uri.path(), "Request without identity");
                Err(ServerError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthUser, ServerError> {
        let (mut parts, _) = request.into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_identity() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "u1")
            .header(USER_EMAIL_HEADER, "u1@example.com")
            .body(())
            .unwrap();

        let user = extract(request).await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.email, "u1@example.com");
    }

    #[tokio::test]
    async fn test_rejects_missing_or_blank_headers() {
        let missing_email = Request::builder()
            .header(USER_ID_HEADER, "u1")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(missing_email).await,
            Err(ServerError::Unauthorized)
        ));

        let blank_id = Request::builder()
            .header(USER_ID_HEADER, "  ")
            .header(USER_EMAIL_HEADER, "u1@example.com")
            .body(())
            .unwrap();
        assert!(matches!(extract(blank_id).await, Err(ServerError::Unauthorized)));
    }
}
