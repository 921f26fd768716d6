/// Identity-provider integration: metadata discovery, key-set caching, and
/// bearer-token verification.
pub mod discovery;
pub mod keys;
pub mod verifier;

pub use discovery::{discover, enforce_signing_policy, ProviderMetadata};
pub use keys::KeySetCache;
pub use verifier::{Identity, TokenVerifier, VerifyError};

/// The one signature algorithm this service trusts. Startup aborts if the
/// provider stops advertising it.
pub const REQUIRED_SIGNING_ALG: &str = "RS256";
