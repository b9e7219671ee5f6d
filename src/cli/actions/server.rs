use crate::{
    api,
    auth::{AuthConfig, AuthState},
    cli::telemetry,
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new().with_token_ttl_seconds(args.token_ttl_seconds);

    debug!("Auth config: {:?}", auth_config);

    let auth_state = Arc::new(AuthState::new(auth_config, &args.jwt_secret));

    let result = api::new(args.port, args.dsn, auth_state).await;

    telemetry::shutdown_tracer();

    result
}
