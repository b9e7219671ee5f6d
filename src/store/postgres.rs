use super::{NewTodo, NewUser, Store, StoreError, Todo, User, UserRecord};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

/// `PostgreSQL` backed store. Expects the tables from `sql/schema.sql`.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn query_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn todo_from_row(row: &PgRow) -> Result<Todo, sqlx::Error> {
    Ok(Todo {
        id: row.try_get("id")?,
        user: row.try_get("user_name")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }

    async fn user_exists(&self, email: &str) -> Result<bool, StoreError> {
        const QUERY: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS exists";
        let row = sqlx::query(QUERY)
            .bind(email)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", QUERY))
            .await?;
        Ok(row.try_get("exists")?)
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        const QUERY: &str = "INSERT INTO users (id, email, name, password, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING id, email, name, created_at, updated_at";
        let result = sqlx::query(QUERY)
            .bind(Uuid::now_v7())
            .bind(&new_user.email)
            .bind(&new_user.name)
            .bind(&new_user.password_hash)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", QUERY))
            .await;

        match result {
            Ok(row) => Ok(user_from_row(&row)?),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateEmail),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        const QUERY: &str =
            "SELECT id, email, name, password, created_at, updated_at FROM users WHERE email = $1";
        let row = sqlx::query(QUERY)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", QUERY))
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserRecord {
            user: user_from_row(&row)?,
            password_hash: row.try_get("password")?,
        }))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        const QUERY: &str =
            "SELECT id, email, name, created_at, updated_at FROM users WHERE id = $1";
        let row = sqlx::query(QUERY)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", QUERY))
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn todo_exists(&self, user: &str, name: &str) -> Result<bool, StoreError> {
        const QUERY: &str =
            "SELECT EXISTS(SELECT 1 FROM todos WHERE user_name = $1 AND name = $2) AS exists";
        let row = sqlx::query(QUERY)
            .bind(user)
            .bind(name)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", QUERY))
            .await?;
        Ok(row.try_get("exists")?)
    }

    async fn insert_todo(&self, new_todo: NewTodo) -> Result<Todo, StoreError> {
        const QUERY: &str = "INSERT INTO todos (id, user_name, name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING id, user_name, name, description, created_at, updated_at";
        let result = sqlx::query(QUERY)
            .bind(Uuid::now_v7())
            .bind(&new_todo.user)
            .bind(&new_todo.name)
            .bind(&new_todo.description)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", QUERY))
            .await;

        match result {
            Ok(row) => Ok(todo_from_row(&row)?),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateTodo),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_todos(&self, user: Option<&str>) -> Result<Vec<Todo>, StoreError> {
        // NULL filter matches every row
        const QUERY: &str = "SELECT id, user_name, name, description, created_at, updated_at \
             FROM todos WHERE ($1::TEXT IS NULL OR user_name = $1) ORDER BY created_at, id";
        let rows = sqlx::query(QUERY)
            .bind(user)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", QUERY))
            .await?;

        Ok(rows
            .iter()
            .map(todo_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
