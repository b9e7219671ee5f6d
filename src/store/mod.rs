//! Persistence for users and todos.
//!
//! Handlers talk to a [`Store`] trait object so the HTTP layer does not care whether
//! records live in `PostgreSQL` ([`PgStore`]) or in process memory ([`MemoryStore`],
//! used by tests). Uniqueness rules are enforced by the store itself: a duplicate
//! email or a duplicate `(user, name)` todo pair is reported as a typed error even
//! when two requests race past the handlers' existence checks.

mod memory;
mod models;
mod postgres;

pub use memory::MemoryStore;
pub use models::{NewTodo, NewUser, Todo, User, UserRecord};
pub use postgres::PgStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Shared handle installed as a request extension.
pub type SharedStore = Arc<dyn Store>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with that email already exists")]
    DuplicateEmail,
    #[error("a todo with that user and name already exists")]
    DuplicateTodo,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trip to the backend, used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn user_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Insert a user; fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn todo_exists(&self, user: &str, name: &str) -> Result<bool, StoreError>;

    /// Insert a todo; fails with [`StoreError::DuplicateTodo`] if `(user, name)` is taken.
    async fn insert_todo(&self, new_todo: NewTodo) -> Result<Todo, StoreError>;

    /// List todos oldest first, optionally only those owned by `user`.
    async fn list_todos(&self, user: Option<&str>) -> Result<Vec<Todo>, StoreError>;
}
