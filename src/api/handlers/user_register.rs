use crate::{
    api::handlers::{internal_error, normalize_email, required, valid_email, AuthToken},
    auth::{AuthState, PasswordHasher},
    store::{NewUser, SharedStore, StoreError},
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct RegisterUser {
    #[schema(example = "listo@example.com")]
    email: String,
    #[schema(example = "listo_password")]
    password: String,
    #[schema(example = "listo_user")]
    name: String,
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("email", &self.email)
            .field("password", &"***")
            .field("name", &self.name)
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/user/register",
    request_body = RegisterUser,
    responses (
        (status = 201, description = "Registration successful", body = AuthToken, content_type = "application/json"),
        (status = 400, description = "Missing or invalid email, password or name; passwords are limited to 72 bytes", body = String),
        (status = 409, description = "User with the specified email already exists", body = String),
        (status = 500, description = "Internal Server Error", body = String),
    ),
    tag= "user"
)]
// axum handler for register
#[instrument(skip(store, auth_state, payload))]
pub async fn register(
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterUser>>,
) -> Response {
    let user: RegisterUser = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload").into_response(),
    };

    debug!("user: {:?}", user);
    let email = normalize_email(&user.email);

    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email").into_response();
    }

    if user.password.is_empty() || PasswordHasher::validate(&user.password).is_err() {
        return (StatusCode::BAD_REQUEST, "Invalid password").into_response();
    }

    let Some(name) = required(&user.name) else {
        return (StatusCode::BAD_REQUEST, "Invalid name").into_response();
    };

    // check if user exists before paying for the hash
    match store.user_exists(&email).await {
        Ok(true) => {
            debug!("User already exists");
            return (
                StatusCode::CONFLICT,
                "A user with that email already exists.",
            )
                .into_response();
        }
        Ok(false) => (),
        Err(e) => {
            error!("Error checking if user exists: {e}");
            return internal_error();
        }
    }

    let password_hash = match auth_state.hasher().hash(&user.password).await {
        Ok(hash) => hash,
        Err(e) => {
            error!("Error hashing password: {e}");
            return internal_error();
        }
    };

    let created = match store
        .insert_user(NewUser {
            email,
            name: name.to_string(),
            password_hash,
        })
        .await
    {
        Ok(created) => created,
        Err(StoreError::DuplicateEmail) => {
            debug!("User inserted concurrently");
            return (
                StatusCode::CONFLICT,
                "A user with that email already exists.",
            )
                .into_response();
        }
        Err(e) => {
            error!("Error inserting user: {e}");
            return internal_error();
        }
    };

    match auth_state.tokens().issue(created.id) {
        Ok(token) => {
            info!(user_id = %created.id, "User registered");
            (StatusCode::CREATED, Json(AuthToken::new(token))).into_response()
        }
        Err(e) => {
            error!("Error issuing token: {e}");
            internal_error()
        }
    }
}
