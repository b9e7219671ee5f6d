use crate::{store::SharedStore, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

const HEALTH_DB_TIMEOUT_SECONDS: u64 = 2;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Database connection is healthy", body = Health),
        (status = 503, description = "Database connection is unhealthy", body = Health)
    ),
    tag= "health",
)]
// axum handler for health
pub async fn health(method: Method, store: Extension<SharedStore>) -> impl IntoResponse {
    let db_healthy = match timeout(
        Duration::from_secs(HEALTH_DB_TIMEOUT_SECONDS),
        store.ping(),
    )
    .await
    {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("Failed to ping database: {}", e);
            false
        }
        Err(_) => {
            warn!("Database health check timed out");
            false
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if db_healthy {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .map_err(|err| {
            debug!("Failed to parse X-App header: {}", err);
        })
        .unwrap_or_else(|()| HeaderMap::new());

    if db_healthy {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewTodo, NewUser, Store, StoreError, Todo, User, UserRecord};
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use std::sync::Arc;
    use uuid::Uuid;

    struct DownStore;

    #[async_trait]
    impl Store for DownStore {
        async fn ping(&self) -> Result<(), StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn user_exists(&self, _: &str) -> Result<bool, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn insert_user(&self, _: NewUser) -> Result<User, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn find_user_by_email(&self, _: &str) -> Result<Option<UserRecord>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn find_user_by_id(&self, _: Uuid) -> Result<Option<User>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn todo_exists(&self, _: &str, _: &str) -> Result<bool, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn insert_todo(&self, _: NewTodo) -> Result<Todo, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn list_todos(&self, _: Option<&str>) -> Result<Vec<Todo>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    #[tokio::test]
    async fn test_health_ok() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let response = health(Method::GET, Extension(store)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let x_app = response
            .headers()
            .get("X-App")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(x_app.starts_with(&format!(
            "{}:{}:",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["database"], "ok");
        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    }

    #[tokio::test]
    async fn test_health_store_down() {
        let store: SharedStore = Arc::new(DownStore);
        let response = health(Method::GET, Extension(store)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["database"], "error");
    }

    #[tokio::test]
    async fn test_health_options_has_empty_body() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let response = health(Method::OPTIONS, Extension(store))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
