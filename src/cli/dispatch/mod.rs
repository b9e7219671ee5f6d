//! Map validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_args() {
        temp_env::with_vars_unset(["LISTO_PORT", "LISTO_TOKEN_TTL_SECONDS"], || {
            let matches = crate::cli::commands::new().get_matches_from(vec![
                "listo",
                "--dsn",
                "postgres://user@localhost:5432/listo",
                "--jwt-secret",
                "s3cr3t",
                "--token-ttl-seconds",
                "90",
            ]);

            let result = handler(&matches);
            assert!(result.is_ok());
            if let Ok(Action::Server(args)) = result {
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/listo");
                assert_eq!(args.jwt_secret.expose_secret(), "s3cr3t");
                assert_eq!(args.token_ttl_seconds, 90);
            }
        });
    }

    #[test]
    fn blank_jwt_secret_rejected() {
        temp_env::with_vars_unset(["LISTO_JWT_SECRET"], || {
            let matches = crate::cli::commands::new().get_matches_from(vec![
                "listo",
                "--dsn",
                "postgres://user@localhost:5432/listo",
                "--jwt-secret",
                "   ",
            ]);

            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err
                    .to_string()
                    .contains("missing required argument: --jwt-secret"));
            }
        });
    }
}
