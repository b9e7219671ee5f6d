//! # Listo (Todo API)
//!
//! `listo` is a small HTTP service: users register and log in with a password,
//! receive a short-lived bearer token, and use it to create todos.
//!
//! ## Authentication
//!
//! - **Passwords** are hashed with bcrypt (cost 10, random salt) and the hash never
//!   leaves the store layer.
//! - **Tokens** are HS256 JWTs carrying `{sub, iat, exp}` and expire 10 minutes after
//!   issuance. They are stateless: rotating the signing secret invalidates all of them,
//!   and there is no revocation list.
//!
//! ## Private routes
//!
//! A private request passes two independent checks before reaching its handler:
//!
//! 1. **Token verification:** the `Authorization: Bearer <token>` header must carry a
//!    token with a valid signature that has not expired.
//! 2. **Account check:** the token subject must still exist in the store, so a token
//!    issued before an account was removed stops working immediately.
//!
//! Missing, invalid and expired tokens all answer `401`. A vanished account answers
//! `404`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
