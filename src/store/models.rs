//! Records persisted by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Public view of an account. The password hash lives in [`UserRecord`] only.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[schema(example = "01928c6e-6b3a-7cc2-9d6e-3f0b9c1f2a10")]
    pub id: Uuid,
    #[schema(example = "listo@example.com")]
    pub email: String,
    #[schema(example = "listo_user")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with its bcrypt hash, as read for login.
#[derive(Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("user", &self.user)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    #[schema(example = "01928c6e-9f1d-7a41-8d0b-5a7e2c4b1e33")]
    pub id: Uuid,
    /// Name of the owning user.
    #[schema(example = "listo_user")]
    pub user: String,
    #[schema(example = "Create an axum api.")]
    pub name: String,
    #[schema(example = "Create an axum api, with authentication and swagger.")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub user: String,
    pub name: String,
    pub description: String,
}
