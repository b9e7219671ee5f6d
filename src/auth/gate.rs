//! Account existence check for verified subjects.
//!
//! A valid signature only proves the token was issued by us; the account behind
//! it may have been removed since. The gate resolves the subject against the store
//! on every private request.

use super::AuthError;
use crate::store::{Store, User};
use tracing::{error, instrument};
use uuid::Uuid;

/// Subject id extracted from a verified bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subject(pub Uuid);

/// Resolve `subject` to its account.
///
/// # Errors
/// [`AuthError::AccountNotFound`] if no such account exists,
/// [`AuthError::StoreUnavailable`] if the store lookup fails.
#[instrument(skip(store))]
pub async fn authorize(store: &dyn Store, subject: Subject) -> Result<User, AuthError> {
    match store.find_user_by_id(subject.0).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthError::AccountNotFound),
        Err(err) => {
            error!("Failed to look up account: {err}");
            Err(AuthError::StoreUnavailable)
        }
    }
}
