use std::{net::SocketAddr, time::Duration};

const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:3000";

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("TURSO_DATABASE_URL environment variable must be set. Did you forget to set up the .env file?")]
    MissingDatabaseUrl,
    #[error("Error parsing LISTEN_ADDRESS: {0}")]
    ListenAddressError(#[from] std::net::AddrParseError),
    #[error("Error parsing WEBHOOK_TIMEOUT_SECONDS: {0}")]
    TimeoutError(#[from] std::num::ParseIntError),
}

#[derive(Debug, Clone)]
pub struct Configuration {
    /// A `libsql://` or `http(s)://` URL for a remote database or a path to a local file
    pub database_url: String,
    pub database_auth_token: String,
    pub listen_address: SocketAddr,
    /// Webhook URL for surveys that don't set their own
    pub default_webhook_url: Option<String>,
    /// There is no timeout for webhook requests if this is not set
    pub webhook_timeout: Option<Duration>,
}

impl Configuration {
    /// Reads the configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url =
            non_empty("TURSO_DATABASE_URL").ok_or(ConfigurationError::MissingDatabaseUrl)?;
        let database_auth_token = lookup("TURSO_AUTH_TOKEN").unwrap_or_default();

        let listen_address = non_empty("LISTEN_ADDRESS")
            .as_deref()
            .unwrap_or(DEFAULT_LISTEN_ADDRESS)
            .parse()?;

        let webhook_timeout = non_empty("WEBHOOK_TIMEOUT_SECONDS")
            .map(|seconds| seconds.trim().parse().map(Duration::from_secs))
            .transpose()?;

        Ok(Self {
            database_url,
            database_auth_token,
            listen_address,
            default_webhook_url: non_empty("DEFAULT_WEBHOOK_URL"),
            webhook_timeout,
        })
    }
}
