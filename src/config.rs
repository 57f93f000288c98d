//! Runtime configuration
//!
//! Parsed from command-line flags with environment fallbacks. Tests build it
//! directly through `Default`.

use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::{DEFAULT_ADDR, DEFAULT_KEY, DEFAULT_SECRET, DEFAULT_SESSION_COOKIE};

/// Minimum secret length accepted for signing sessions
pub const MIN_SECRET_LEN: usize = 16;

#[derive(Parser, Clone)]
#[command(
    name = "greeter",
    version = crate::VERSION,
    about = "Greeter - greeting pages, signed cookie sessions and a JSON echo API"
)]
pub struct AppConfig {
    /// Address to listen on
    #[arg(long, env = "GREETER_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Secret used to sign the session cookie
    #[arg(long, env = "GREETER_SECRET", default_value = DEFAULT_SECRET, hide_env_values = true)]
    pub secret: String,

    /// Value served by GET /key
    #[arg(long, env = "GREETER_KEY", default_value = DEFAULT_KEY)]
    pub key: String,

    /// Name of the session cookie
    #[arg(long, env = "GREETER_SESSION_COOKIE", default_value = DEFAULT_SESSION_COOKIE)]
    pub session_cookie: String,

    /// Log filter (tracing EnvFilter syntax)
    #[arg(long, env = "GREETER_LOG", default_value = "info")]
    pub log_level: String,

    /// Debug logging, overrides --log-level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            secret: DEFAULT_SECRET.to_string(),
            key: DEFAULT_KEY.to_string(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            log_level: "info".to_string(),
            verbose: false,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("addr", &self.addr)
            .field("secret", &"<redacted>")
            .field("key", &self.key)
            .field("session_cookie", &self.session_cookie)
            .field("log_level", &self.log_level)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl AppConfig {
    /// Check values that clap cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: self.secret.len(),
            });
        }
        self.socket_addr()?;
        self.env_filter()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr.parse().map_err(|source| ConfigError::InvalidAddr {
            addr: self.addr.clone(),
            source,
        })
    }

    /// Log filter for the subscriber
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        let directive = if self.verbose { "debug" } else { self.log_level.as_str() };
        EnvFilter::try_new(directive).map_err(|_| ConfigError::InvalidLogLevel(directive.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
