/// Cross-service contact lookup against the identity provider
use crate::contacts::Contact;
use crate::error::{RolodexError, RolodexResult};

/// Header carrying the shared internal service key.
pub const SERVICE_KEY_HEADER: &str = "x-service-key";

/// Credential presented to the provider for one lookup.
///
/// Passed explicitly per call so the propagation policy is auditable: the
/// resolver never copies headers out of the inbound request on its own.
#[derive(Debug, Clone)]
pub enum LookupAuth {
    /// The caller's own bearer token, forwarded
    Forwarded(String),
    /// The shared internal service key
    ServiceKey(String),
}

/// Resolves email addresses to full identity records via the provider's
/// lookup endpoint.
#[derive(Clone)]
pub struct ContactResolver {
    http: reqwest::Client,
    base_url: String,
}

impl ContactResolver {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Look up the user record for an email address.
    ///
    /// A provider 404 means the email is unknown and is safe to reveal; every
    /// other failure is opaque upstream trouble and is not retried here.
    pub async fn lookup(&self, email: &str, auth: &LookupAuth) -> RolodexResult<Contact> {
        let url = format!(
            "{}/api/users/by-email/{}",
            self.base_url,
            urlencoding::encode(email)
        );

        let request = self.http.get(&url);
        let request = match auth {
            LookupAuth::Forwarded(token) => request.bearer_auth(token),
            LookupAuth::ServiceKey(key) => request.header(SERVICE_KEY_HEADER, key),
        };

        let response = request
            .send()
            .await
            .map_err(|e| RolodexError::Upstream(format!("contact lookup failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RolodexError::NotFound(format!(
                "no user with email {}",
                email
            )));
        }

        if !response.status().is_success() {
            return Err(RolodexError::Upstream(format!(
                "contact lookup returned {}",
                response.status()
            )));
        }

        response
            .json::<Contact>()
            .await
            .map_err(|e| RolodexError::Upstream(format!("invalid lookup response: {}", e)))
    }
}
