//! Process configuration, loaded from the environment once at startup and
//! passed into the server state explicitly. Request handlers never read the
//! environment themselves.

use anyhow::{Context, Result};
use std::env;

pub struct Config {
    pub http_port: u16,
    /// Shared secret for signing and verifying session tokens.
    pub token_secret: String,
}

impl Config {
    /// Load from the environment. The signing secret has no default; a
    /// missing value is a fatal startup error.
    pub fn from_env() -> Result<Self> {
        let token_secret = env::var("ALUMNI_JWT_SECRET")
            .context("ALUMNI_JWT_SECRET must be set to the token signing secret")?;
        let http_port = match env::var("ALUMNI_HTTP_PORT") {
            Ok(v) => v.parse().with_context(|| format!("invalid ALUMNI_HTTP_PORT value: {v}"))?,
            Err(_) => 7878,
        };
        Ok(Self { http_port, token_secret })
    }
}
