//! Middleware for private routes.
//!
//! [`verify_token`] runs first and binds the token [`Subject`] to the request;
//! [`authorize_account`] then resolves that subject to a live [`User`]. Handlers
//! behind both layers read the account from `Extension<User>`.

use crate::{
    auth::{self, AuthError, AuthState, Subject},
    store::{SharedStore, User},
};
use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};

/// Bearer token from the `Authorization` header, `None` when absent or empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Verify the bearer token and bind its subject to the request.
///
/// # Errors
/// [`AuthError::MissingToken`], [`AuthError::InvalidToken`] or
/// [`AuthError::ExpiredToken`], all answered with `401`.
pub async fn verify_token(
    auth_state: Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(token) = bearer_token(request.headers()) else {
        debug!("Missing bearer token");
        return Err(AuthError::MissingToken);
    };

    let subject = auth_state.tokens().verify(token).map_err(|e| {
        debug!("Rejected bearer token: {e}");
        e
    })?;

    request.extensions_mut().insert(Subject(subject));
    Ok(next.run(request).await)
}

/// Resolve the verified subject to an existing account.
///
/// # Errors
/// [`AuthError::AccountNotFound`] (`404`) when the account is gone,
/// [`AuthError::StoreUnavailable`] (`500`) when the lookup fails.
pub async fn authorize_account(
    store: Extension<SharedStore>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(subject) = request.extensions().get::<Subject>().copied() else {
        // layer ordering bug, not a client error
        error!("authorize_account ran without a verified subject");
        return Err(AuthError::MissingToken);
    };

    let user: User = auth::authorize(store.0.as_ref(), subject).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{AuthConfig, FixedClock},
        store::{MemoryStore, NewUser, Store},
    };
    use anyhow::Result;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, Request as HttpRequest, StatusCode},
        middleware::from_fn,
        routing::get,
        Router,
    };
    use secrecy::SecretString;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new().with_bcrypt_cost(4),
            &SecretString::from("guard-test-secret"),
        ))
    }

    async fn whoami(user: Extension<User>) -> String {
        user.email.clone()
    }

    fn app(store: SharedStore, auth_state: Arc<AuthState>) -> Router {
        Router::new()
            .route("/private", get(whoami))
            .route_layer(from_fn(authorize_account))
            .route_layer(from_fn(verify_token))
            .layer(Extension(auth_state))
            .layer(Extension(store))
    }

    async fn seeded_store() -> Result<(Arc<MemoryStore>, User)> {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                email: "guard@example.com".to_string(),
                name: "guard".to_string(),
                password_hash: "unused".to_string(),
            })
            .await?;
        Ok((store, user))
    }

    fn request(authorization: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/private");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  abc.def "));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() -> Result<()> {
        let (store, user) = seeded_store().await?;
        let auth_state = auth_state();
        let token = auth_state.tokens().issue(user.id)?;

        let response = app(store, auth_state)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&bytes[..], b"guard@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() -> Result<()> {
        let (store, _) = seeded_store().await?;

        let response = app(store, auth_state()).oneshot(request(None)).await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["auth"], false);
        assert_eq!(json["message"], "No token provided.");
        Ok(())
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() -> Result<()> {
        let (store, _) = seeded_store().await?;

        let response = app(store, auth_state())
            .oneshot(request(Some("Bearer not-a-jwt")))
            .await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Failed to authenticate token.");
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() -> Result<()> {
        let (store, user) = seeded_store().await?;
        let secret = SecretString::from("guard-test-secret");
        let issued_at = 1_700_000_000;
        let issuer = AuthState::new(AuthConfig::new(), &secret)
            .with_clock(Arc::new(FixedClock(issued_at)));
        let token = issuer.tokens().issue(user.id)?;
        let verifier = Arc::new(
            AuthState::new(AuthConfig::new(), &secret)
                .with_clock(Arc::new(FixedClock(issued_at + 601))),
        );

        let response = app(store, verifier)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Token has expired.");
        Ok(())
    }

    #[tokio::test]
    async fn test_removed_account_is_not_found() -> Result<()> {
        let (store, user) = seeded_store().await?;
        let auth_state = auth_state();
        let token = auth_state.tokens().issue(user.id)?;
        assert!(store.remove_user(user.id).await);

        let response = app(store, auth_state)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["auth"], false);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_subject_is_not_found() -> Result<()> {
        let (store, _) = seeded_store().await?;
        let auth_state = auth_state();
        let token = auth_state.tokens().issue(Uuid::new_v4())?;

        let response = app(store, auth_state)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
