use std::time::Duration;

use crate::crypto::EncryptionMasterKey;
use crate::{PusherError, Result, Token};

/// Configuration for the Pusher client
#[derive(Clone, Debug)]
pub struct Config {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub app_id: String,
    pub token: Token,
    pub timeout: Option<Duration>,
    pub encryption_master_key: Option<EncryptionMasterKey>,
    /// Caller-configured ceiling on serialized event payloads, in bytes.
    /// No limit when unset.
    pub max_event_payload_bytes: Option<usize>,
}

impl Config {
    /// Creates a new configuration. All three credentials must be
    /// non-empty; they are validated here once and immutable after.
    pub fn new(
        app_id: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let app_id = app_id.into();
        let key = key.into();
        let secret = secret.into();

        if app_id.is_empty() || key.is_empty() || secret.is_empty() {
            return Err(PusherError::Config {
                message: "app_id, key and secret must all be non-empty".to_string(),
            });
        }

        Ok(Self {
            scheme: "https".to_string(),
            host: "api.pusherapp.com".to_string(),
            port: None,
            app_id,
            token: Token::new(key, secret),
            timeout: Some(Duration::from_secs(30)),
            encryption_master_key: None,
            max_event_payload_bytes: None,
        })
    }

    /// Sets the cluster
    pub fn cluster(mut self, cluster: &str) -> Self {
        self.host = format!("api-{}.pusher.com", cluster);
        self
    }

    /// Sets whether to use TLS
    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.scheme = if use_tls { "https" } else { "http" }.to_string();
        self
    }

    /// Sets the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the encryption master key
    pub fn encryption_master_key(mut self, key: EncryptionMasterKey) -> Self {
        self.encryption_master_key = Some(key);
        self
    }

    /// Sets the encryption master key from its base64 encoding
    pub fn encryption_master_key_base64(mut self, key_base64: &str) -> Result<Self> {
        self.encryption_master_key = Some(EncryptionMasterKey::from_base64(key_base64)?);
        Ok(self)
    }

    /// Caps serialized event payloads at `limit` bytes
    pub fn max_event_payload_bytes(mut self, limit: usize) -> Self {
        self.max_event_payload_bytes = Some(limit);
        self
    }

    /// Gets the base URL
    pub fn base_url(&self) -> String {
        let port = match self.port {
            Some(port) => format!(":{}", port),
            None => String::new(),
        };
        format!("{}://{}{}", self.scheme, self.host, port)
    }
}
