use crate::auth::DEFAULT_TOKEN_TTL_SECONDS;
use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign and verify bearer tokens")
                .long_help(
                    "Secret used to sign and verify bearer tokens. Changing it invalidates every token already issued.",
                )
                .env("LISTO_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Bearer token lifetime in seconds")
                .env("LISTO_TOKEN_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
}

impl Options {
    /// Parse auth options from matches.
    ///
    /// # Errors
    /// Returns an error if the signing secret is missing or blank.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .filter(|secret| !secret.trim().is_empty())
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_seconds,
        })
    }
}
