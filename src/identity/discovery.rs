/// Provider metadata discovery and signing-policy enforcement
///
/// The metadata document is fetched once at startup and is immutable for the
/// process lifetime. Any failure here is fatal: the service must not accept
/// requests it cannot verify.
use crate::error::{RolodexError, RolodexResult};
use serde::{Deserialize, Serialize};

pub const WELL_KNOWN_CONFIG_PATH: &str = "/.well-known/openid-configuration";

/// The subset of the provider's published configuration this service uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Where the provider publishes its public signing keys
    pub jwks_uri: String,
    /// Signing algorithms the provider currently issues tokens with
    pub id_token_signing_alg_values_supported: Vec<String>,
}

/// Fetch the provider's well-known configuration document.
pub async fn discover(
    http: &reqwest::Client,
    provider_base_url: &str,
) -> RolodexResult<ProviderMetadata> {
    let url = format!(
        "{}{}",
        provider_base_url.trim_end_matches('/'),
        WELL_KNOWN_CONFIG_PATH
    );

    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| RolodexError::Discovery(format!("failed to fetch provider metadata: {}", e)))?;

    if !response.status().is_success() {
        return Err(RolodexError::Discovery(format!(
            "provider metadata endpoint returned {}",
            response.status()
        )));
    }

    let metadata: ProviderMetadata = response
        .json()
        .await
        .map_err(|e| RolodexError::Discovery(format!("invalid provider metadata: {}", e)))?;

    if metadata.jwks_uri.trim().is_empty() {
        return Err(RolodexError::Discovery(
            "provider metadata is missing jwks_uri".to_string(),
        ));
    }

    Ok(metadata)
}

/// Refuse to start if the provider no longer advertises the required
/// algorithm. Accepting a weaker or removed algorithm would downgrade every
/// subsequent verification.
pub fn enforce_signing_policy(metadata: &ProviderMetadata, required: &str) -> RolodexResult<()> {
    if metadata
        .id_token_signing_alg_values_supported
        .iter()
        .any(|alg| alg == required)
    {
        Ok(())
    } else {
        Err(RolodexError::Policy(format!(
            "provider does not advertise {} (supported: {:?})",
            required, metadata.id_token_signing_alg_values_supported
        )))
    }
}
