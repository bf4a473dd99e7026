use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};

#[derive(Clone, Debug, Parser)]
#[command(name = "allerta-api")]
pub struct AllertaApiConfig {
    #[clap(
        short,
        long,
        env = "ALLERTA_API_BIND_ADDR",
        default_value = "0.0.0.0:4000"
    )]
    pub bind_addr: SocketAddr,

    /// Origin of the web console, allowed by CORS.
    #[clap(
        long,
        env = "ALLERTA_API_PUBLIC_URL",
        default_value = "http://localhost:5173"
    )]
    pub public_url: String,

    #[clap(long, default_value_t = false)]
    pub dump_openapi: bool,

    #[clap(
        long,
        env = "ALLERTA_API_MONGODB_URI",
        default_value = "mongodb://localhost:27017/allerta"
    )]
    pub mongodb_uri: String,

    /// Secret used to sign and verify bearer tokens (HS256).
    ///
    /// Mutually exclusive with `token_secret_file`.
    #[clap(long, env = "ALLERTA_API_TOKEN_SECRET", conflicts_with = "token_secret_file")]
    pub token_secret: Option<String>,

    /// Path to a file holding the token secret. Surrounding whitespace is
    /// trimmed.
    ///
    /// Mutually exclusive with `token_secret`.
    #[clap(long, env = "ALLERTA_API_TOKEN_SECRET_FILE")]
    pub token_secret_file: Option<PathBuf>,

    /// Lifetime of issued bearer tokens, in seconds.
    #[clap(long, env = "ALLERTA_API_TOKEN_TTL_SECS", default_value_t = 86400)]
    pub token_ttl_secs: i64,

    /// bcrypt work factor for stored passwords.
    #[clap(
        long,
        env = "ALLERTA_API_BCRYPT_COST",
        default_value_t = allerta_db::password::DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,
}

impl AllertaApiConfig {
    /// Get the token secret from either inline config or file.
    ///
    /// Checks `token_secret` first, then falls back to reading from
    /// `token_secret_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither `token_secret` nor `token_secret_file` is configured
    /// - `token_secret_file` path doesn't exist or can't be read
    /// - The resulting secret is empty
    pub fn get_token_secret(&self) -> anyhow::Result<String> {
        let secret = if let Some(ref secret) = self.token_secret {
            secret.clone()
        } else if let Some(ref path) = self.token_secret_file {
            std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read token secret file: {}", e))?
                .trim()
                .to_string()
        } else {
            return Err(anyhow::anyhow!(
                "no token secret configured (set ALLERTA_API_TOKEN_SECRET or ALLERTA_API_TOKEN_SECRET_FILE)"
            ));
        };

        if secret.is_empty() {
            return Err(anyhow::anyhow!("token secret must not be empty"));
        }

        Ok(secret)
    }
}
