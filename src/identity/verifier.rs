/// Bearer-token verification against the provider's key set
use crate::identity::keys::KeySetCache;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Why a token was rejected. Logged internally; never returned to callers.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("no signing key with id {0}")]
    KeyNotFound(String),

    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),

    #[error("signature verification failed")]
    Signature,

    #[error("token outside its validity window")]
    Expired,

    #[error("required claim missing or invalid: {0}")]
    Claims(String),
}

/// A verified caller identity.
///
/// Only [`TokenVerifier::verify`] produces values of this type. Handlers
/// receive it through the auth extractor and must never build one from raw
/// claim data.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub alias: String,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    email: Option<String>,
    alias: Option<String>,
}

/// Validates bearer tokens and produces verified identities.
pub struct TokenVerifier {
    keys: Arc<KeySetCache>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeySetCache>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        // Tolerate modest clock skew between this service and the issuer.
        validation.leeway = 60;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        Self { keys, validation }
    }

    /// Verify a raw bearer token. Each step short-circuits with its own
    /// rejection reason:
    /// structure, key resolution, signature, validity window, claims.
    pub async fn verify(&self, raw_token: &str) -> Result<Identity, VerifyError> {
        let header =
            decode_header(raw_token).map_err(|e| VerifyError::Malformed(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Malformed("token header has no kid".to_string()))?;

        let key = self.keys.get_key(&kid).await?;

        let data =
            decode::<RawClaims>(raw_token, &key, &self.validation).map_err(map_decode_error)?;

        let id = required_claim(data.claims.sub, "sub")?;
        let email = required_claim(data.claims.email, "email")?;
        let alias = required_claim(data.claims.alias, "alias")?;

        Ok(Identity { id, email, alias })
    }
}

fn required_claim(value: Option<String>, name: &str) -> Result<String, VerifyError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(VerifyError::Claims(name.to_string())),
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> VerifyError {
    use jsonwebtoken::errors::ErrorKind;

    match e.kind() {
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => VerifyError::Expired,
        ErrorKind::InvalidSignature => VerifyError::Signature,
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
            VerifyError::Claims(e.to_string())
        }
        _ => VerifyError::Malformed(e.to_string()),
    }
}
