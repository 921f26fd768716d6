/// Remote key-set cache
///
/// Caches the provider's public signing keys by key id. An unknown key id
/// triggers a refetch (covering rotation) before the token is rejected; a key
/// absent from the cache is never assumed stale without that refetch first.
use crate::identity::verifier::VerifyError;
use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

/// A single public key as published by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    #[serde(default)]
    pub n: String,
    #[serde(default)]
    pub e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSetResponse {
    keys: Vec<Jwk>,
}

#[derive(Default)]
struct Snapshot {
    keys: HashMap<String, Jwk>,
    fetched_at: Option<DateTime<Utc>>,
}

/// Shared cache of the provider's signing keys.
///
/// Reads vastly outnumber writes, so the snapshot sits behind a read-write
/// lock; refetches are serialized through a separate mutex so concurrent
/// misses for the same key id collapse into one upstream request.
pub struct KeySetCache {
    jwks_uri: String,
    http: reqwest::Client,
    snapshot: RwLock<Snapshot>,
    refresh: Mutex<()>,
}

impl KeySetCache {
    pub fn new(jwks_uri: String, http: reqwest::Client) -> Self {
        Self {
            jwks_uri,
            http,
            snapshot: RwLock::new(Snapshot::default()),
            refresh: Mutex::new(()),
        }
    }

    /// Initial fetch, performed once at startup so the first request does not
    /// pay for it.
    pub async fn prime(&self) -> Result<(), VerifyError> {
        self.refetch().await
    }

    /// When the key set was last fetched.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.fetched_at
    }

    /// Resolve a key id to a decoding key, refetching the set on a miss.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        if let Some(jwk) = self.lookup(kid).await {
            return decoding_key(&jwk);
        }

        // Unknown kid: most likely a rotation. Take the refresh lock and
        // re-check, since another request may have refetched while we waited.
        let _guard = self.refresh.lock().await;
        if let Some(jwk) = self.lookup(kid).await {
            return decoding_key(&jwk);
        }

        self.refetch().await?;

        match self.lookup(kid).await {
            Some(jwk) => decoding_key(&jwk),
            None => Err(VerifyError::KeyNotFound(kid.to_string())),
        }
    }

    async fn lookup(&self, kid: &str) -> Option<Jwk> {
        self.snapshot.read().await.keys.get(kid).cloned()
    }

    async fn refetch(&self) -> Result<(), VerifyError> {
        let response = self
            .http
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| VerifyError::KeySetUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifyError::KeySetUnavailable(format!(
                "key set endpoint returned {}",
                response.status()
            )));
        }

        let set: JwkSetResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::KeySetUnavailable(format!("invalid key set: {}", e)))?;

        let keys: HashMap<String, Jwk> = set
            .keys
            .into_iter()
            .filter(|k| k.kty == "RSA")
            .map(|k| (k.kid.clone(), k))
            .collect();

        tracing::debug!(count = keys.len(), "key set refreshed");

        let mut snapshot = self.snapshot.write().await;
        snapshot.keys = keys;
        snapshot.fetched_at = Some(Utc::now());

        Ok(())
    }
}

fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, VerifyError> {
    DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|e| {
        VerifyError::KeySetUnavailable(format!("unusable key material for {}: {}", jwk.kid, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use rand::rngs::OsRng;
    use rsa::traits::PublicKeyParts;
    use rsa::RsaPrivateKey;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_jwk(kid: &str) -> serde_json::Value {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public_key = private_key.to_public_key();
        json!({
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "alg": "RS256",
            "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        })
    }

    async fn mount_jwks(server: &MockServer, keys: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })))
            .mount(server)
            .await;
    }

    fn cache_for(server: &MockServer) -> KeySetCache {
        KeySetCache::new(format!("{}/keys", server.uri()), reqwest::Client::new())
    }

    #[tokio::test]
    async fn prime_populates_cache() {
        let server = MockServer::start().await;
        mount_jwks(&server, vec![test_jwk("key-1")]).await;

        let cache = cache_for(&server);
        assert!(cache.last_refresh().await.is_none());

        cache.prime().await.unwrap();
        assert!(cache.last_refresh().await.is_some());
        assert!(cache.get_key("key-1").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_kid_triggers_refetch() {
        let server = MockServer::start().await;
        mount_jwks(&server, vec![test_jwk("key-1")]).await;

        let cache = cache_for(&server);
        cache.prime().await.unwrap();

        // Rotate: the endpoint now serves key-2 as well.
        server.reset().await;
        mount_jwks(&server, vec![test_jwk("key-1"), test_jwk("key-2")]).await;

        assert!(cache.get_key("key-2").await.is_ok());
    }

    #[tokio::test]
    async fn missing_kid_after_refetch_is_key_not_found() {
        let server = MockServer::start().await;
        mount_jwks(&server, vec![test_jwk("key-1")]).await;

        let cache = cache_for(&server);
        cache.prime().await.unwrap();

        let result = cache.get_key("no-such-key").await;
        assert!(matches!(result, Err(VerifyError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn non_rsa_keys_are_ignored() {
        let server = MockServer::start().await;
        mount_jwks(
            &server,
            vec![
                json!({ "kty": "OKP", "kid": "ed-key", "crv": "Ed25519", "x": "abc" }),
                test_jwk("rsa-key"),
            ],
        )
        .await;

        let cache = cache_for(&server);
        cache.prime().await.unwrap();

        assert!(cache.get_key("rsa-key").await.is_ok());
        assert!(matches!(
            cache.get_key("ed-key").await,
            Err(VerifyError::KeyNotFound(_))
        ));
    }

    #[tokio::test]
    async fn fetch_failure_is_key_set_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        assert!(matches!(
            cache.prime().await,
            Err(VerifyError::KeySetUnavailable(_))
        ));
    }
}
