use crate::{auth::AuthFailure, store::User};
use axum::{extract::Extension, Json};
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path= "/user/isAuthorized",
    responses (
        (status = 200, description = "Token is valid and the account exists", body = User),
        (status = 401, description = "Missing, invalid or expired token", body = AuthFailure),
        (status = 404, description = "Account no longer exists", body = AuthFailure),
    ),
    security(("bearerAuth" = [])),
    tag= "user"
)]
// the guard layers already resolved the account; echo it back without the password
#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn is_authorized(user: Extension<User>) -> Json<User> {
    debug!("Account is authorized");
    Json(user.0)
}
