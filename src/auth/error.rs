use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Failures on the way from an incoming request to an authorized account.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided.")]
    MissingToken,
    #[error("Failed to authenticate token.")]
    InvalidToken,
    #[error("Token has expired.")]
    ExpiredToken,
    #[error("You must have an account to make this request.")]
    AccountNotFound,
    #[error("account store unavailable")]
    StoreUnavailable,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::StoreUnavailable | Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::StoreUnavailable | Self::Signing(_) => "Internal Server Error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Body returned when a private route rejects a request.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AuthFailure {
    #[schema(example = false)]
    pub auth: bool,
    #[schema(example = "No token provided.")]
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthFailure {
            auth: false,
            message: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
