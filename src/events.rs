//! Trigger and batch body construction.
//!
//! Bodies are built by pure functions so the validation and encryption
//! paths are testable without touching the HTTP transport.

use serde_json::{Value, json};

use crate::channel::Channel;
use crate::config::Config;
use crate::{PusherError, Result, validation};

/// Most channels a single trigger call may address.
pub const MAX_TRIGGER_CHANNELS: usize = 100;

/// Most events a single batch call may carry.
pub const MAX_BATCH_SIZE: usize = 10;

/// Event data for triggering
#[derive(Debug, serde::Serialize)]
pub struct Event {
    pub name: String,
    pub data: String,
    pub channels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Batch event data
#[derive(Debug, serde::Serialize)]
pub struct BatchEvent {
    pub name: String,
    pub channel: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Optional parameters for triggering events
#[derive(Debug, Clone, Default)]
pub struct TriggerParams {
    pub socket_id: Option<String>,
    pub info: Option<String>,
}

/// String payloads go on the wire as-is; everything else is serialized.
fn ensure_json(data: &Value) -> Result<String> {
    match data {
        Value::String(s) => Ok(s.clone()),
        _ => Ok(serde_json::to_string(data)?),
    }
}

#[cfg(feature = "encryption")]
fn encrypted_data(config: &Config, channel: &Channel, data: &Value) -> Result<String> {
    let master_key = config
        .encryption_master_key
        .as_ref()
        .ok_or_else(|| PusherError::Encryption {
            message: "Set the encryption master key before triggering events on encrypted channels"
                .to_string(),
        })?;
    let plaintext = serde_json::to_string(data)?;
    let payload = crate::crypto::encrypt_payload(channel, &plaintext, master_key)?;
    Ok(serde_json::to_string(&payload)?)
}

#[cfg(not(feature = "encryption"))]
fn encrypted_data(_config: &Config, _channel: &Channel, _data: &Value) -> Result<String> {
    Err(PusherError::Encryption {
        message: "Triggering on encrypted channels requires the `encryption` feature".to_string(),
    })
}

/// Builds the `/events` body, validating every input that feeds it.
///
/// A single encrypted channel gets the payload envelope substituted for
/// `data`. Addressing several channels where one is encrypted is
/// rejected: each encrypted channel needs its own envelope, and that
/// interaction is undefined for a single trigger call.
pub fn build_trigger_body(
    config: &Config,
    channels: &[String],
    event_name: &str,
    data: &Value,
    params: Option<&TriggerParams>,
) -> Result<Value> {
    validation::validate_event_name(event_name)?;

    if channels.len() > MAX_TRIGGER_CHANNELS {
        return Err(PusherError::Validation {
            message: format!(
                "Cannot trigger to more than {} channels ({} given)",
                MAX_TRIGGER_CHANNELS,
                channels.len()
            ),
        });
    }

    let channels: Vec<Channel> = channels
        .iter()
        .map(|name| Channel::parse(name.as_str()))
        .collect::<Result<_>>()?;

    if let Some(params) = params {
        if let Some(socket_id) = params.socket_id.as_deref() {
            validation::validate_socket_id(socket_id)?;
        }
    }

    let data_str = if channels.len() == 1 && channels[0].is_encrypted() {
        encrypted_data(config, &channels[0], data)?
    } else {
        if let Some(encrypted) = channels.iter().find(|c| c.is_encrypted()) {
            return Err(PusherError::Validation {
                message: format!(
                    "Cannot trigger to multiple channels when one is encrypted ('{}')",
                    encrypted.name()
                ),
            });
        }
        ensure_json(data)?
    };

    validation::validate_event_data_size(&data_str, config.max_event_payload_bytes)?;

    let event = Event {
        name: event_name.to_string(),
        data: data_str,
        channels: channels.into_iter().map(Channel::into_name).collect(),
        socket_id: params.and_then(|p| p.socket_id.clone()),
        info: params.and_then(|p| p.info.clone()),
    };
    Ok(serde_json::to_value(event)?)
}

/// Builds the `/batch_events` body. Each batch event names exactly one
/// channel, so encrypted-channel events are enveloped individually.
pub fn build_batch_body(config: &Config, batch: Vec<BatchEvent>) -> Result<Value> {
    if batch.len() > MAX_BATCH_SIZE {
        return Err(PusherError::BatchTooLarge {
            count: batch.len(),
            max: MAX_BATCH_SIZE,
        });
    }

    let mut prepared = Vec::with_capacity(batch.len());
    for mut event in batch {
        validation::validate_event_name(&event.name)?;
        let channel = Channel::parse(event.channel.as_str())?;
        if let Some(socket_id) = event.socket_id.as_deref() {
            validation::validate_socket_id(socket_id)?;
        }

        if channel.is_encrypted() {
            let data: Value = serde_json::from_str(&event.data)?;
            event.data = encrypted_data(config, &channel, &data)?;
        }

        validation::validate_event_data_size(&event.data, config.max_event_payload_bytes)?;
        prepared.push(event);
    }

    Ok(json!({ "batch": prepared }))
}

/// Builds the `/events` body for a single user's server-to-user channel.
/// The `#server-to-user-` prefix is outside the public channel grammar,
/// so the user id is validated instead of the channel name.
pub fn build_user_event_body(
    config: &Config,
    user_id: &str,
    event_name: &str,
    data: &Value,
) -> Result<Value> {
    validation::validate_user_id(user_id)?;
    validation::validate_event_name(event_name)?;

    let data_str = ensure_json(data)?;
    validation::validate_event_data_size(&data_str, config.max_event_payload_bytes)?;

    let event = Event {
        name: event_name.to_string(),
        data: data_str,
        channels: vec![format!("#server-to-user-{}", user_id)],
        socket_id: None,
        info: None,
    };
    Ok(serde_json::to_value(event)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> Config {
        Config::new("1234", "key", "secret").unwrap()
    }

    fn batch_event(channel: &str) -> BatchEvent {
        BatchEvent {
            name: "my-event".to_string(),
            channel: channel.to_string(),
            data: r#"{"n":1}"#.to_string(),
            socket_id: None,
            info: None,
        }
    }

    #[test]
    fn test_ensure_json() {
        let string_val = json!("test");
        assert_eq!(ensure_json(&string_val).unwrap(), "test");

        let object_val = json!({"key": "value"});
        assert_eq!(ensure_json(&object_val).unwrap(), r#"{"key":"value"}"#);
    }

    #[test]
    fn test_trigger_body_layout() {
        let body = build_trigger_body(
            &config(),
            &["my-channel".to_string()],
            "my-event",
            &json!({"n": 1}),
            Some(&TriggerParams {
                socket_id: Some("123.456".to_string()),
                info: None,
            }),
        )
        .unwrap();

        assert_eq!(body["name"], "my-event");
        assert_eq!(body["channels"], json!(["my-channel"]));
        assert_eq!(body["data"], r#"{"n":1}"#);
        assert_eq!(body["socket_id"], "123.456");
        assert!(body.get("info").is_none());
    }

    #[test]
    fn test_trigger_validates_channel_names() {
        let err = build_trigger_body(
            &config(),
            &["bad channel".to_string()],
            "my-event",
            &json!({}),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PusherError::ChannelNameFormat { .. }));
    }

    #[test]
    fn test_trigger_validates_socket_id() {
        let err = build_trigger_body(
            &config(),
            &["my-channel".to_string()],
            "my-event",
            &json!({}),
            Some(&TriggerParams {
                socket_id: Some("444.444:".to_string()),
                info: None,
            }),
        )
        .unwrap_err();
        assert!(matches!(err, PusherError::SocketIdFormat { .. }));
    }

    #[test]
    fn test_trigger_rejects_too_many_channels() {
        let channels: Vec<String> = (0..=MAX_TRIGGER_CHANNELS)
            .map(|i| format!("channel-{}", i))
            .collect();
        let err =
            build_trigger_body(&config(), &channels, "my-event", &json!({}), None).unwrap_err();
        assert!(matches!(err, PusherError::Validation { .. }));
    }

    #[test]
    fn test_trigger_rejects_long_event_names() {
        let err = build_trigger_body(
            &config(),
            &["my-channel".to_string()],
            &"e".repeat(201),
            &json!({}),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PusherError::Validation { .. }));
    }

    #[test]
    fn test_trigger_applies_data_size_policy() {
        let config = config().max_event_payload_bytes(8);
        let err = build_trigger_body(
            &config,
            &["my-channel".to_string()],
            "my-event",
            &json!({"padding": "way too long"}),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PusherError::DataTooLarge { .. }));
    }

    #[test]
    fn test_trigger_rejects_encrypted_among_multiple_channels() {
        let err = build_trigger_body(
            &config(),
            &[
                "private-encrypted-room".to_string(),
                "plain-room".to_string(),
            ],
            "my-event",
            &json!({}),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PusherError::Validation { .. }));
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_trigger_requires_master_key_for_encrypted_channel() {
        let err = build_trigger_body(
            &config(),
            &["private-encrypted-room".to_string()],
            "my-event",
            &json!({}),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PusherError::Encryption { .. }));
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_trigger_envelopes_single_encrypted_channel() {
        let config = config()
            .encryption_master_key(crate::crypto::EncryptionMasterKey::new(vec![3u8; 32]).unwrap());
        let body = build_trigger_body(
            &config,
            &["private-encrypted-room".to_string()],
            "my-event",
            &json!({"msg": "hi"}),
            None,
        )
        .unwrap();

        let envelope: crate::crypto::EncryptedPayload =
            serde_json::from_str(body["data"].as_str().unwrap()).unwrap();
        assert!(!envelope.nonce.is_empty());
        assert!(!envelope.ciphertext.is_empty());
    }

    #[test]
    fn test_batch_boundary() {
        let batch: Vec<BatchEvent> = (0..MAX_BATCH_SIZE).map(|_| batch_event("room")).collect();
        assert!(build_batch_body(&config(), batch).is_ok());

        let batch: Vec<BatchEvent> = (0..=MAX_BATCH_SIZE).map(|_| batch_event("room")).collect();
        let err = build_batch_body(&config(), batch).unwrap_err();
        assert!(matches!(
            err,
            PusherError::BatchTooLarge { count: 11, max: 10 }
        ));
    }

    #[test]
    fn test_batch_validates_each_event() {
        let err = build_batch_body(&config(), vec![batch_event("bad channel")]).unwrap_err();
        assert!(matches!(err, PusherError::ChannelNameFormat { .. }));

        let mut event = batch_event("room");
        event.socket_id = Some("letters".to_string());
        let err = build_batch_body(&config(), vec![event]).unwrap_err();
        assert!(matches!(err, PusherError::SocketIdFormat { .. }));
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_batch_envelopes_encrypted_events_individually() {
        let config = config()
            .encryption_master_key(crate::crypto::EncryptionMasterKey::new(vec![3u8; 32]).unwrap());
        let batch = vec![batch_event("room"), batch_event("private-encrypted-room")];
        let body = build_batch_body(&config, batch).unwrap();

        let events = body["batch"].as_array().unwrap();
        assert_eq!(events[0]["data"], r#"{"n":1}"#);
        let envelope: crate::crypto::EncryptedPayload =
            serde_json::from_str(events[1]["data"].as_str().unwrap()).unwrap();
        assert!(!envelope.ciphertext.is_empty());
    }

    #[test]
    fn test_user_event_body() {
        let body =
            build_user_event_body(&config(), "user-1", "my-event", &json!({"n": 1})).unwrap();
        assert_eq!(body["channels"], json!(["#server-to-user-user-1"]));

        assert!(build_user_event_body(&config(), "", "my-event", &json!({})).is_err());
    }
}
