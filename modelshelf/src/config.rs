//! Client configuration.
//!
//! A [`RegistryConfig`] captures everything that stays immutable for the
//! lifetime of a client: the resolved server base address, the default
//! author stamped on new model versions, and an optional bearer token.

use std::env;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{Error, Result};

/// Environment variable holding the registry base address.
pub const ENV_ADDRESS: &str = "MODEL_REGISTRY_ADDRESS";
/// Environment variable holding the default author name.
pub const ENV_AUTHOR: &str = "MODEL_REGISTRY_AUTHOR";
/// Environment variable holding a bearer token.
pub const ENV_TOKEN: &str = "MODEL_REGISTRY_TOKEN";

const DEFAULT_USER_AGENT: &str = concat!("modelshelf/", env!("CARGO_PKG_VERSION"));

/// Immutable client configuration.
///
/// The token is wrapped in [`SecretString`], so `Debug` output redacts it and
/// reading it back requires an explicit `expose_secret()`.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Resolved server base address.
    pub base_url: Url,
    /// Default author recorded on model versions created by the facade.
    pub author: String,
    /// Optional bearer token passed through on every request.
    pub token: Option<SecretString>,
    /// User agent header value.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Build a configuration from a server address and author name.
    ///
    /// Fails with [`Error::Configuration`] if the address is not a valid
    /// absolute URL.
    pub fn new(server_address: &str, author: &str) -> Result<Self> {
        let base_url = Url::parse(server_address)
            .map_err(|e| Error::Configuration(format!("invalid server address: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "server address {server_address} cannot be used as a base URL"
            )));
        }
        Ok(Self {
            base_url,
            author: author.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a configuration from the environment.
    ///
    /// `MODEL_REGISTRY_ADDRESS` is required; `MODEL_REGISTRY_AUTHOR` defaults
    /// to `"unknown"`; `MODEL_REGISTRY_TOKEN` is attached when present.
    pub fn from_env() -> Result<Self> {
        let address = env::var(ENV_ADDRESS)
            .map_err(|_| Error::Configuration(format!("{ENV_ADDRESS} is not set")))?;
        let author = env::var(ENV_AUTHOR).unwrap_or_else(|_| "unknown".to_string());
        let mut config = Self::new(&address, &author)?;
        if let Ok(token) = env::var(ENV_TOKEN) {
            config = config.with_token(token);
        }
        Ok(config)
    }

    /// Expose the bearer token, if any. Use sparingly.
    pub fn token_value(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }
}
