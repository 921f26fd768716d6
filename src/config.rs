/// Configuration management for the rolodex service
use crate::error::{RolodexError, RolodexResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub provider: ProviderConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub contacts_db: PathBuf,
}

/// Identity-provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the identity provider
    pub base_url: String,
    /// Credential policy for cross-service contact lookups
    pub lookup_auth: LookupAuthPolicy,
    /// Timeout applied to every outbound HTTP call (seconds)
    pub http_timeout_secs: u64,
}

/// How contact lookups authenticate against the identity provider.
///
/// Forwarding keeps the end user visible to the provider; a service key does
/// not. The deployment picks exactly one; there is no implicit fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum LookupAuthPolicy {
    /// Forward the caller's own bearer token
    Forward,
    /// Present the shared internal service key
    ServiceKey { key: String },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> RolodexResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("ROLODEX_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("ROLODEX_PORT")
            .map_err(|_| RolodexError::Config("ROLODEX_PORT is required".to_string()))?
            .parse()
            .map_err(|_| RolodexError::Config("ROLODEX_PORT must be a port number".to_string()))?;

        let contacts_db = env::var("ROLODEX_DB_LOCATION")
            .map(PathBuf::from)
            .map_err(|_| RolodexError::Config("ROLODEX_DB_LOCATION is required".to_string()))?;

        let base_url = env::var("ROLODEX_IDP_BASE_URL")
            .map_err(|_| RolodexError::Config("ROLODEX_IDP_BASE_URL is required".to_string()))?;

        let lookup_auth = match env::var("ROLODEX_IDP_LOOKUP_AUTH").as_deref() {
            Err(_) | Ok("forward") => LookupAuthPolicy::Forward,
            Ok("service-key") => {
                let key = env::var("ROLODEX_IDP_SERVICE_KEY").map_err(|_| {
                    RolodexError::Config(
                        "ROLODEX_IDP_SERVICE_KEY is required when ROLODEX_IDP_LOOKUP_AUTH is service-key"
                            .to_string(),
                    )
                })?;
                LookupAuthPolicy::ServiceKey { key }
            }
            Ok(other) => {
                return Err(RolodexError::Config(format!(
                    "ROLODEX_IDP_LOOKUP_AUTH must be 'forward' or 'service-key', got '{}'",
                    other
                )))
            }
        };

        let http_timeout_secs = env::var("ROLODEX_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig { hostname, port },
            storage: StorageConfig { contacts_db },
            provider: ProviderConfig {
                base_url,
                lookup_auth,
                http_timeout_secs,
            },
            logging: LoggingConfig { level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> RolodexResult<()> {
        if self.service.hostname.is_empty() {
            return Err(RolodexError::Config("hostname cannot be empty".to_string()));
        }

        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(RolodexError::Config(
                "ROLODEX_IDP_BASE_URL must be an http(s) URL".to_string(),
            ));
        }

        Ok(())
    }
}
