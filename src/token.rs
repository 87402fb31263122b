use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto;

/// App key and secret pair used to sign requests and tokens
#[derive(Clone)]
pub struct Token {
    pub key: String,
    secret: SecretString,
}

/// Wrapper for the secret that ensures it's zeroed on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct SecretString(String);

impl Token {
    /// Creates a new token with the given key and secret
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: SecretString(secret.into()),
        }
    }

    /// Signs the string with HMAC-SHA256 under the app secret.
    pub fn sign(&self, data: &str) -> String {
        crypto::hmac_sha256_hex(self.secret.0.as_bytes(), data.as_bytes())
    }

    /// Verifies a signature against the data in constant time.
    pub fn verify(&self, data: &str, signature: &str) -> bool {
        crypto::secure_compare(&self.sign(data), signature)
    }

    pub(crate) fn has_secret(&self) -> bool {
        !self.secret.0.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
