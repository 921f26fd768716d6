/// Authentication extractor: the gate every protected route passes through
use crate::{
    api::middleware::extract_bearer_token,
    context::AppContext,
    error::RolodexError,
    identity::{Identity, VerifyError},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Verified caller attached to a request.
///
/// Carries the raw bearer token alongside the identity so the contact lookup
/// can forward the caller's credential as an explicit capability rather than
/// copying headers ambiently.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub bearer_token: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = RolodexError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        // A missing or malformed header short-circuits without touching the
        // verifier (or any downstream service).
        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            RolodexError::Authentication("missing or malformed authorization header".to_string())
        })?;

        let identity = state.verifier.verify(&token).await.map_err(|e| match e {
            // A dead key-set endpoint is dependency trouble, not an auth
            // decision about this token.
            VerifyError::KeySetUnavailable(detail) => {
                RolodexError::Upstream(format!("key set fetch failed: {}", detail))
            }
            other => RolodexError::Authentication(other.to_string()),
        })?;

        Ok(AuthContext {
            identity,
            bearer_token: token,
        })
    }
}
