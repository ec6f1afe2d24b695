//! Document storage client with HMAC-signed, expiring access URLs.
//! Uploaded files are immutable; only new keys are ever written.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::FileRef;
use crate::ports::{FileStore, FileStoreError};

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SignedUrlFileStore {
    client: Client,
    base_url: String,
    signing_secret: String,
    url_ttl_secs: i64,
}

impl SignedUrlFileStore {
    pub fn new(base_url: String, signing_secret: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            signing_secret,
            url_ttl_secs: 60,
        }
    }

    pub fn with_url_ttl(mut self, ttl_secs: i64) -> Self {
        self.url_ttl_secs = ttl_secs;
        self
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/objects/{}", self.base_url, key)
    }
}

/// Hex HMAC-SHA256 over `key:expires`.
pub fn sign(secret: &str, key: &str, expires: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(format!("{key}:{expires}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time verification of a signed access URL's parameters.
pub fn verify(secret: &str, key: &str, expires: i64, signature: &str) -> bool {
    if expires < Utc::now().timestamp() {
        return false;
    }
    let Ok(decoded) = hex::decode(signature) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(format!("{key}:{expires}").as_bytes());
    mac.verify_slice(&decoded).is_ok()
}

#[async_trait]
impl FileStore for SignedUrlFileStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<FileRef, FileStoreError> {
        let format = name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
        let key = format!("documents/{}-{}", Uuid::new_v4(), name);
        let size = bytes.len() as i64;

        let response = self
            .client
            .put(self.object_url(&key))
            .body(bytes)
            .send()
            .await
            .map_err(|e| FileStoreError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FileStoreError::Upstream(format!(
                "upload failed with {}",
                response.status()
            )));
        }

        Ok(FileRef {
            key,
            format,
            bytes: size,
        })
    }

    fn access_url(&self, file: &FileRef) -> String {
        let expires = Utc::now().timestamp() + self.url_ttl_secs;
        let signature = sign(&self.signing_secret, &file.key, expires);
        format!(
            "{}?expires={}&signature={}",
            self.object_url(&file.key),
            expires,
            signature
        )
    }

    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError> {
        let response = self
            .client
            .get(self.access_url(file))
            .send()
            .await
            .map_err(|e| FileStoreError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(FileStoreError::NotFound(file.key.clone())),
            status if status.is_success() => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| FileStoreError::Upstream(e.to_string())),
            status => Err(FileStoreError::Upstream(format!(
                "download failed with {status}"
            ))),
        }
    }
}
