//! Canonical request signing for the Channels REST API.
//!
//! An independent verifier holding the same secret must be able to
//! reconstruct the exact string that was signed, so every byte of the
//! query string here is part of the wire contract.

use std::fmt::Write;

use crate::Token;
use crate::crypto;

/// A signed request, ready to hand to the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: String,
    /// Absolute resource path: `/apps/<app_id>/<resource>`.
    pub path: String,
    /// Query string including the trailing `auth_signature` parameter.
    pub query_string: String,
}

impl SignedRequest {
    /// Joins the request onto a base URL such as `https://api.pusherapp.com`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}?{}", base_url, self.path, self.query_string)
    }
}

/// Seconds since the Unix epoch.
pub fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock set before the Unix epoch")
        .as_secs()
}

/// Builds the signed query string for a REST call with an explicit
/// timestamp, so callers (and tests) can freeze the clock.
///
/// Caller-supplied params are emitted first, in the order given. The
/// server reconstructs the identical string, so ordering is part of the
/// wire contract; do not sort.
pub fn sign_request(
    token: &Token,
    app_id: &str,
    method: &str,
    resource_path: &str,
    params: &[(String, String)],
    body: Option<&str>,
    timestamp: u64,
) -> SignedRequest {
    let mut query = String::new();
    for (key, value) in params {
        let _ = write!(query, "{}={}&", key, value);
    }
    let _ = write!(
        query,
        "auth_key={}&auth_timestamp={}&auth_version=1.0",
        token.key, timestamp
    );
    if let Some(body) = body {
        let _ = write!(query, "&body_md5={}", crypto::md5_hex(body.as_bytes()));
    }

    let method = method.to_uppercase();
    let path = format!("/apps/{}/{}", app_id, resource_path.trim_start_matches('/'));
    let to_sign = format!("{}\n{}\n{}", method, path, query);
    let signature = token.sign(&to_sign);

    let _ = write!(query, "&auth_signature={}", signature);

    SignedRequest {
        method,
        path,
        query_string: query,
    }
}

/// Signs with the current wall-clock time.
pub fn sign_request_now(
    token: &Token,
    app_id: &str,
    method: &str,
    resource_path: &str,
    params: &[(String, String)],
    body: Option<&str>,
) -> SignedRequest {
    sign_request(
        token,
        app_id,
        method,
        resource_path,
        params,
        body,
        unix_timestamp(),
    )
}
