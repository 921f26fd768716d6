/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    contacts::{ContactResolver, ContactStore},
    db,
    error::{RolodexError, RolodexResult},
    identity::{self, KeySetCache, TokenVerifier, REQUIRED_SIGNING_ALG},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub verifier: Arc<TokenVerifier>,
    pub resolver: Arc<ContactResolver>,
    pub contacts: Arc<ContactStore>,
}

impl AppContext {
    /// Create a new application context from configuration.
    ///
    /// Any failure here is a startup failure: the process exits before
    /// serving a single request.
    pub async fn new(config: ServerConfig) -> RolodexResult<Self> {
        config.validate()?;

        let db = db::create_pool(&config.storage.contacts_db).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("rolodex/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.provider.http_timeout_secs))
            .build()
            .map_err(|e| RolodexError::Internal(format!("failed to create HTTP client: {}", e)))?;

        // Discover the provider's signing policy and refuse to start if the
        // required algorithm is gone.
        let metadata = identity::discover(&http, &config.provider.base_url).await?;
        identity::enforce_signing_policy(&metadata, REQUIRED_SIGNING_ALG)?;

        tracing::info!(
            jwks_uri = %metadata.jwks_uri,
            "identity provider metadata discovered"
        );

        let keys = Arc::new(KeySetCache::new(metadata.jwks_uri.clone(), http.clone()));
        keys.prime()
            .await
            .map_err(|e| RolodexError::Discovery(format!("initial key set fetch failed: {}", e)))?;

        let verifier = Arc::new(TokenVerifier::new(keys));
        let resolver = Arc::new(ContactResolver::new(
            http,
            config.provider.base_url.clone(),
        ));
        let contacts = Arc::new(ContactStore::new(db.clone()));

        Ok(Self {
            config: Arc::new(config),
            db,
            verifier,
            resolver,
            contacts,
        })
    }
}
