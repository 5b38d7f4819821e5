//! # Google Cloud KMS Backend
//!
//! Secp256k1 public key retrieval and digest signing through the Cloud KMS
//! REST API, for keys with the `EC_SIGN_SECP256K1_SHA256` algorithm.
//!
//! ```text
//! GoogleCloudKmsClient (implements KmsK256Backend)
//!   ├── Authentication (service account)
//!   ├── Public Key Retrieval (PEM, converted to DER)
//!   └── Digest Signing (asymmetricSign with a precomputed digest)
//! ```
//!
//! A key id names the crypto key, optionally pinned to a version:
//! `eth-signer` or `eth-signer/cryptoKeyVersions/3`.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use google_cloud_auth::credentials::{
    service_account::Builder as GcpCredBuilder, CacheableResource, Credentials,
};
use http::{Extensions, HeaderMap};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{
    config::{GoogleCloudKmsKeyFileConfig, GoogleCloudKmsWalletFileConfig},
    services::kms::{KmsError, KmsK256Backend, KmsResult},
};

const KEY_VERSION_SEGMENT: &str = "/cryptoKeyVersions/";

#[derive(Clone)]
pub struct GoogleCloudKmsClient {
    project_id: String,
    key: GoogleCloudKmsKeyFileConfig,
    base_url: String,
    credentials: Option<Arc<Credentials>>,
    client: Client,
}

impl GoogleCloudKmsClient {
    pub fn new(config: &GoogleCloudKmsWalletFileConfig) -> KmsResult<Self> {
        if config.key.key_ring_id.is_empty() {
            return Err(KmsError::MissingConfiguration(
                "Google Cloud KMS key ring is not configured".to_string(),
            ));
        }

        let account = &config.service_account;
        let secret = |value: &crate::config::PlainOrEnvConfigValue| {
            value
                .get_value()
                .map_err(|e| KmsError::MissingConfiguration(e.to_string()))
        };
        let credentials_json = serde_json::json!({
            "type": "service_account",
            "project_id": account.project_id,
            "private_key_id": secret(&account.private_key_id)?,
            "private_key": secret(&account.private_key)?,
            "client_email": secret(&account.client_email)?,
            "client_id": account.client_id,
            "auth_uri": account.auth_uri,
            "token_uri": account.token_uri,
            "auth_provider_x509_cert_url": account.auth_provider_x509_cert_url,
            "client_x509_cert_url": account.client_x509_cert_url,
            "universe_domain": account.universe_domain,
        });
        let credentials = GcpCredBuilder::new(credentials_json)
            .build()
            .map_err(|e| KmsError::ConfigError(e.to_string()))?;

        info!(
            "Google Cloud KMS client initialised for project {}, key ring {}",
            account.project_id, config.key.key_ring_id
        );

        Ok(Self {
            project_id: account.project_id.clone(),
            key: config.key.clone(),
            base_url: format!("https://cloudkms.{}", account.universe_domain),
            credentials: Some(Arc::new(credentials)),
            client: Client::new(),
        })
    }

    /// Unauthenticated client against an arbitrary base url.
    #[cfg(test)]
    pub fn new_for_testing(
        base_url: &str,
        project_id: &str,
        key: GoogleCloudKmsKeyFileConfig,
    ) -> Self {
        Self {
            project_id: project_id.to_string(),
            key,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            client: Client::new(),
        }
    }

    async fn get_auth_headers(&self) -> KmsResult<HeaderMap> {
        let Some(credentials) = &self.credentials else {
            return Ok(HeaderMap::new());
        };

        let cacheable_headers = credentials
            .headers(Extensions::new())
            .await
            .map_err(|e| KmsError::HttpError(format!("Failed to obtain access token: {e}")))?;

        match cacheable_headers {
            CacheableResource::New { data, .. } => Ok(data),
            CacheableResource::NotModified => Err(KmsError::HttpError(
                "Credentials returned no headers".to_string(),
            )),
        }
    }

    async fn read_response(resp: reqwest::Response, key_path: &str) -> KmsResult<Value> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| KmsError::HttpError(format!("Failed to read KMS response: {e}")))?;

        match status {
            s if s.is_success() => serde_json::from_str(&text)
                .map_err(|e| KmsError::ParseError(format!("{e}: {text}"))),
            StatusCode::NOT_FOUND => Err(KmsError::KeyNotFound(key_path.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(KmsError::PermissionError(
                format!("KMS request failed ({status}): {text}"),
            )),
            _ => Err(KmsError::ApiError(format!(
                "KMS request failed ({status}): {text}"
            ))),
        }
    }

    async fn kms_get(&self, url: &str, key_path: &str) -> KmsResult<Value> {
        let headers = self.get_auth_headers().await?;
        let resp = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| KmsError::HttpError(e.to_string()))?;

        Self::read_response(resp, key_path).await
    }

    async fn kms_post(&self, url: &str, key_path: &str, body: &Value) -> KmsResult<Value> {
        let headers = self.get_auth_headers().await?;
        let resp = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| KmsError::HttpError(e.to_string()))?;

        Self::read_response(resp, key_path).await
    }

    /// Full resource name of the key version addressed by `key_id`.
    pub fn get_key_path(&self, key_id: &str) -> KmsResult<String> {
        let (key_name, version) = match key_id.split_once(KEY_VERSION_SEGMENT) {
            Some((name, version)) => {
                let version = version.parse::<u32>().map_err(|_| {
                    KmsError::ConfigError(format!("Invalid key version in '{key_id}'"))
                })?;
                (name, version)
            }
            None => (key_id, self.key.key_version),
        };

        if key_name.is_empty() || key_name.contains('/') {
            return Err(KmsError::ConfigError(format!(
                "Invalid Google Cloud KMS key id '{key_id}'"
            )));
        }

        Ok(format!(
            "projects/{}/locations/{}/keyRings/{}/cryptoKeys/{}/cryptoKeyVersions/{}",
            self.project_id, self.key.location, self.key.key_ring_id, key_name, version
        ))
    }

    fn string_field<'v>(body: &'v Value, field: &str) -> KmsResult<&'v str> {
        body.get(field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| KmsError::MissingField(field.to_string()))
    }
}

#[async_trait]
impl KmsK256Backend for GoogleCloudKmsClient {
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> KmsResult<Vec<u8>> {
        let key_path = self.get_key_path(key_id)?;
        let url = format!("{}/v1/{}/publicKey", self.base_url, key_path);
        debug!("KMS publicKey URL: {}", url);

        let body = self.kms_get(&url, &key_path).await?;
        let pem_str = Self::string_field(&body, "pem")?;
        let pem = pem::parse(pem_str).map_err(|e| KmsError::ParseError(e.to_string()))?;

        Ok(pem.contents().to_vec())
    }

    async fn sign_digest<'a, 'b>(
        &'a self,
        key_id: &'b str,
        digest: [u8; 32],
    ) -> KmsResult<Vec<u8>> {
        let key_path = self.get_key_path(key_id)?;
        let url = format!("{}/v1/{}:asymmetricSign", self.base_url, key_path);
        debug!("KMS asymmetricSign URL: {}", url);

        // The key's algorithm fixes the digest field name; secp256k1 keys
        // only offer SHA-256, so the keccak digest travels in `sha256`.
        let body = serde_json::json!({
            "name": key_path,
            "digest": {
                "sha256": STANDARD.encode(digest)
            }
        });

        let resp = self.kms_post(&url, &key_path, &body).await?;
        let signature_b64 = Self::string_field(&resp, "signature")?;

        STANDARD
            .decode(signature_b64)
            .map_err(|e| KmsError::ParseError(e.to_string()))
    }
}
