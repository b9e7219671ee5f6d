use super::{NewTodo, NewUser, Store, StoreError, Todo, User, UserRecord};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRecord>,
    todos: Vec<Todo>,
}

/// In-process store with the same uniqueness rules as the database schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop an account, returning whether it existed.
    pub async fn remove_user(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|record| record.user.id != id);
        tables.users.len() != before
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn user_exists(&self, email: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|record| record.user.email == email))
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|record| record.user.email == new_user.email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: new_user.email,
            name: new_user.name,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(UserRecord {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|record| record.user.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|record| record.user.id == id)
            .map(|record| record.user.clone()))
    }

    async fn todo_exists(&self, user: &str, name: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .todos
            .iter()
            .any(|todo| todo.user == user && todo.name == name))
    }

    async fn insert_todo(&self, new_todo: NewTodo) -> Result<Todo, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .todos
            .iter()
            .any(|todo| todo.user == new_todo.user && todo.name == new_todo.name)
        {
            return Err(StoreError::DuplicateTodo);
        }

        let now = Utc::now();
        let todo = Todo {
            id: Uuid::now_v7(),
            user: new_todo.user,
            name: new_todo.name,
            description: new_todo.description,
            created_at: now,
            updated_at: now,
        };
        tables.todos.push(todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self, user: Option<&str>) -> Result<Vec<Todo>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .todos
            .iter()
            .filter(|todo| user.map_or(true, |owner| todo.user == owner))
            .cloned()
            .collect())
    }
}
