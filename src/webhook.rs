//! Inbound webhook validation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::{PusherError, Result, Token, crypto};

/// A single event carried by a webhook body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WebhookEvent {
    pub name: String,
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
}

/// Outcome of validating one inbound webhook.
#[derive(Debug)]
pub struct WebhookResult {
    pub is_valid: bool,
    /// Every problem found, in check order; empty when valid.
    pub validation_errors: Vec<String>,
    pub events: Vec<WebhookEvent>,
    pub time: Option<SystemTime>,
}

/// Validates inbound webhooks against the app secret.
///
/// Unlike the other validation paths, problems are accumulated into one
/// report rather than failing at the first, so a consumer gets the full
/// diagnostic picture in a single pass.
#[derive(Debug, Clone)]
pub struct WebhookValidator {
    token: Token,
    expose_unverified_payload: bool,
}

impl WebhookValidator {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            expose_unverified_payload: true,
        }
    }

    /// When disabled, `events` and `time` are withheld unless the
    /// signature verifies. The permissive default matches the historical
    /// behavior of this API: a parseable body is exposed even when the
    /// webhook is flagged invalid.
    pub fn expose_unverified_payload(mut self, expose: bool) -> Self {
        self.expose_unverified_payload = expose;
        self
    }

    /// Checks `body` against `signature`, accumulating every problem
    /// found. An unset app secret is a programmer error and fails
    /// immediately instead of being reported in the result.
    pub fn validate(&self, signature: Option<&str>, body: Option<&str>) -> Result<WebhookResult> {
        if !self.token.has_secret() {
            return Err(PusherError::Config {
                message: "Webhook validation requires a non-empty app secret".to_string(),
            });
        }

        let mut validation_errors = Vec::new();

        let signature = signature.unwrap_or("");
        if signature.is_empty() {
            validation_errors.push("Webhook signature is missing or empty".to_string());
        }

        let body = body.unwrap_or("");
        let mut parsed: Option<Value> = None;
        if body.is_empty() {
            validation_errors.push("Webhook body is missing or empty".to_string());
        } else {
            match serde_json::from_str::<Value>(body) {
                Ok(value) => parsed = Some(value),
                Err(e) => {
                    validation_errors.push(format!("Webhook body is not valid JSON: {}", e));
                }
            }
        }

        // A signature is only meaningful against a body that parsed; a
        // garbled body already invalidates the webhook on its own.
        if parsed.is_some() {
            let expected = self.token.sign(body);
            if !crypto::secure_compare(&expected, signature) {
                validation_errors.push(format!(
                    "Webhook signature mismatch: expected '{}', got '{}'",
                    expected, signature
                ));
            }
        }

        let is_valid = validation_errors.is_empty();
        let (events, time) = match parsed {
            Some(value) if is_valid || self.expose_unverified_payload => extract_payload(&value),
            _ => (Vec::new(), None),
        };

        Ok(WebhookResult {
            is_valid,
            validation_errors,
            events,
            time,
        })
    }
}

fn extract_payload(value: &Value) -> (Vec<WebhookEvent>, Option<SystemTime>) {
    let events = value
        .get("events")
        .cloned()
        .and_then(|events| serde_json::from_value(events).ok())
        .unwrap_or_default();

    let time = value
        .get("time_ms")
        .and_then(Value::as_u64)
        .map(|ms| UNIX_EPOCH + Duration::from_millis(ms));

    (events, time)
}
