//! Cryptographic primitives shared by the signing, authorization and
//! webhook paths.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
#[cfg(feature = "encryption")]
use sodiumoxide::crypto::secretbox;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{PusherError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Required length of an encryption master key in bytes.
pub const ENCRYPTION_MASTER_KEY_BYTES: usize = 32;

/// Computes HMAC-SHA256 over `message` keyed by `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// HMAC-SHA256 as a lowercase hex string (64 chars).
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    format!("{:x}", mac.finalize().into_bytes())
}

/// MD5 digest as a lowercase hex string.
///
/// Only used for the `body_md5` query parameter, where it is a wire-format
/// checksum rather than a security control.
pub fn md5_hex(data: &[u8]) -> String {
    let digest = md5::compute(data);
    hex::encode(digest.as_ref())
}

/// Constant-time string comparison to prevent timing attacks
pub fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// A 32-byte master key for private-encrypted channels, zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionMasterKey(Vec<u8>);

impl EncryptionMasterKey {
    /// Creates a master key from raw bytes, enforcing the 32-byte length.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() != ENCRYPTION_MASTER_KEY_BYTES {
            return Err(PusherError::Config {
                message: format!(
                    "Encryption master key must be {} bytes, got {}",
                    ENCRYPTION_MASTER_KEY_BYTES,
                    bytes.len()
                ),
            });
        }
        Ok(Self(bytes))
    }

    /// Creates a master key from its base64 encoding.
    pub fn from_base64(key_base64: &str) -> Result<Self> {
        let decoded = BASE64.decode(key_base64).map_err(|_| PusherError::Config {
            message: "Invalid base64 encryption master key".to_string(),
        })?;
        Self::new(decoded)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncryptionMasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptionMasterKey")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Derives the per-channel shared secret: HMAC-SHA256 over the UTF-8
/// channel name keyed by the master key. The output is used directly as a
/// symmetric encryption key, so two channels must never map to the same
/// secret.
pub fn derive_shared_secret(master_key: &EncryptionMasterKey, channel: &str) -> [u8; 32] {
    hmac_sha256(master_key.as_bytes(), channel.as_bytes())
}

/// Encrypted event payload substituted for `data` when triggering on a
/// private-encrypted channel. Constructed fresh per trigger, never reused.
#[cfg(feature = "encryption")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EncryptedPayload {
    pub nonce: String,
    pub ciphertext: String,
}

/// Seals `plaintext` for the channel with XSalsa20-Poly1305 under the
/// derived shared secret. A fresh nonce is drawn from the OS CSPRNG on
/// every call; reusing a nonce under the same key breaks confidentiality.
#[cfg(feature = "encryption")]
pub fn encrypt_payload(
    channel: &crate::channel::Channel,
    plaintext: &str,
    master_key: &EncryptionMasterKey,
) -> Result<EncryptedPayload> {
    use rand::TryRngCore;
    use rand::rngs::OsRng;

    let mut nonce_bytes = [0u8; secretbox::NONCEBYTES];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| PusherError::Encryption {
            message: format!("Failed to draw a nonce from the system RNG: {}", e),
        })?;

    seal_payload(channel, plaintext, master_key, nonce_bytes)
}

/// Deterministic half of `encrypt_payload`: everything past the nonce
/// draw.
#[cfg(feature = "encryption")]
fn seal_payload(
    channel: &crate::channel::Channel,
    plaintext: &str,
    master_key: &EncryptionMasterKey,
    nonce_bytes: [u8; secretbox::NONCEBYTES],
) -> Result<EncryptedPayload> {
    let key_bytes = derive_shared_secret(master_key, channel.name());
    let key = secretbox::Key::from_slice(&key_bytes).ok_or_else(|| PusherError::Encryption {
        message: format!(
            "Channel shared secret must be {} bytes long",
            secretbox::KEYBYTES
        ),
    })?;

    let nonce = secretbox::Nonce::from_slice(&nonce_bytes).ok_or_else(|| PusherError::Encryption {
        message: "Failed to build a nonce from random bytes".to_string(),
    })?;

    let sealed = secretbox::seal(plaintext.as_bytes(), &nonce, &key);

    Ok(EncryptedPayload {
        nonce: BASE64.encode(nonce_bytes),
        ciphertext: BASE64.encode(&sealed),
    })
}
