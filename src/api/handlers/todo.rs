//! Todo endpoints.
//!
//! Listing is public. Creating requires a verified token for an existing account,
//! the body's `user` must be that account's name, and the `(user, name)` pair must
//! be unused.

use crate::{
    api::handlers::{internal_error, required},
    auth::AuthFailure,
    store::{NewTodo, SharedStore, StoreError, Todo, User},
};
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::{IntoParams, ToSchema};

const TODO_EXISTS: &str = "A todo with that user and name already exists.";
const NOT_OWNER: &str = "You can only create todos for your own account.";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CreateTodo {
    /// The user name.
    #[schema(example = "listo_user")]
    user: String,
    /// The todo name.
    #[schema(example = "Create an axum api.")]
    name: String,
    /// The todo description.
    #[schema(example = "Create an axum api, with authentication and swagger.")]
    description: String,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct TodoFilter {
    /// Only return todos owned by this user name.
    user: Option<String>,
}

#[utoipa::path(
    get,
    path= "/todo",
    params(TodoFilter),
    responses (
        (status = 200, description = "A list of todos", body = [Todo]),
        (status = 500, description = "Internal Server Error", body = String),
    ),
    tag= "todo"
)]
#[instrument(skip(store))]
pub async fn list_todos(store: Extension<SharedStore>, filter: Query<TodoFilter>) -> Response {
    let user = filter.user.as_deref().and_then(required);

    match store.list_todos(user).await {
        Ok(todos) => {
            debug!(count = todos.len(), "Listed todos");
            (StatusCode::OK, Json(todos)).into_response()
        }
        Err(e) => {
            error!("Error listing todos: {e}");
            internal_error()
        }
    }
}

#[utoipa::path(
    post,
    path= "/todo/create",
    request_body = CreateTodo,
    responses (
        (status = 201, description = "Created a todo", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing user, name or description", body = String),
        (status = 401, description = "Missing, invalid or expired token", body = AuthFailure),
        (status = 403, description = "user is not the authenticated account's name", body = String),
        (status = 404, description = "Account no longer exists", body = AuthFailure),
        (status = 409, description = "A todo with that user and name already exists", body = String),
        (status = 500, description = "Internal Server Error", body = String),
    ),
    security(("bearerAuth" = [])),
    tag= "todo"
)]
#[instrument(skip(store, account, payload), fields(account_id = %account.id))]
pub async fn create_todo(
    store: Extension<SharedStore>,
    account: Extension<User>,
    payload: Option<Json<CreateTodo>>,
) -> Response {
    let todo: CreateTodo = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload").into_response(),
    };

    let (Some(user), Some(name), Some(description)) = (
        required(&todo.user),
        required(&todo.name),
        required(&todo.description),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            "user, name and description are required",
        )
            .into_response();
    };

    if user != account.name {
        debug!(requested_user = user, "Todo for another account rejected");
        return (StatusCode::FORBIDDEN, NOT_OWNER).into_response();
    }

    match store.todo_exists(user, name).await {
        Ok(true) => {
            debug!("Todo already exists");
            return (StatusCode::CONFLICT, TODO_EXISTS).into_response();
        }
        Ok(false) => (),
        Err(e) => {
            error!("Error checking if todo exists: {e}");
            return internal_error();
        }
    }

    let new_todo = NewTodo {
        user: user.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    };

    match store.insert_todo(new_todo).await {
        Ok(created) => {
            info!(todo_id = %created.id, "Todo created");
            (StatusCode::CREATED, "Todo created.").into_response()
        }
        Err(StoreError::DuplicateTodo) => (StatusCode::CONFLICT, TODO_EXISTS).into_response(),
        Err(e) => {
            error!("Error inserting todo: {e}");
            internal_error()
        }
    }
}
