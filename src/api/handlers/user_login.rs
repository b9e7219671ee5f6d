use crate::{
    api::handlers::{internal_error, normalize_email, AuthToken},
    auth::AuthState,
    store::SharedStore,
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

const INVALID_CREDENTIALS: &str = "Invalid Credentials";

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginUser {
    #[schema(example = "listo@example.com")]
    email: String,
    #[schema(example = "listo_password")]
    password: String,
}

impl std::fmt::Debug for LoginUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginUser")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Body of a rejected password.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LoginFailure {
    #[schema(example = false)]
    pub auth: bool,
    pub token: Option<String>,
    #[schema(example = "Invalid Credentials")]
    pub message: String,
}

#[utoipa::path(
    post,
    path= "/user/login",
    request_body = LoginUser,
    responses (
        (status = 201, description = "Logged in", body = AuthToken, content_type = "application/json"),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Wrong password", body = LoginFailure),
        (status = 404, description = "No user with that email", body = String),
        (status = 500, description = "Internal Server Error", body = String),
    ),
    tag= "user"
)]
// axum handler for login
#[instrument(skip(store, auth_state, payload))]
pub async fn login(
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginUser>>,
) -> Response {
    let credentials: LoginUser = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload").into_response(),
    };

    let email = normalize_email(&credentials.email);

    let record = match store.find_user_by_email(&email).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!("Login for unknown email");
            return (StatusCode::NOT_FOUND, INVALID_CREDENTIALS).into_response();
        }
        Err(e) => {
            error!("Error looking up user: {e}");
            return internal_error();
        }
    };

    match auth_state
        .hasher()
        .verify(&credentials.password, &record.password_hash)
        .await
    {
        Ok(true) => (),
        Ok(false) => {
            debug!(user_id = %record.user.id, "Wrong password");
            let body = LoginFailure {
                auth: false,
                token: None,
                message: INVALID_CREDENTIALS.to_string(),
            };
            return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        }
        Err(e) => {
            error!("Error verifying password: {e}");
            return internal_error();
        }
    }

    match auth_state.tokens().issue(record.user.id) {
        Ok(token) => {
            info!(user_id = %record.user.id, "User logged in");
            (StatusCode::CREATED, Json(AuthToken::new(token))).into_response()
        }
        Err(e) => {
            error!("Error issuing token: {e}");
            internal_error()
        }
    }
}
