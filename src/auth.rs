//! Channel subscription authorization and user sign-in tokens.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;

use crate::channel::{Channel, ChannelKind};
use crate::crypto::{self, EncryptionMasterKey};
use crate::{PusherError, Result, Token, validation};

/// Authentication data for socket connections
#[derive(Debug, serde::Serialize)]
pub struct SocketAuth {
    pub auth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
}

/// User authentication data
#[derive(Debug, serde::Serialize)]
pub struct UserAuth {
    pub auth: String,
    pub user_data: String,
}

/// Member payload for presence channel subscriptions.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PresenceChannelData {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<Value>,
}

/// Payload for user sign-in.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserData {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watchlist: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<Value>,
}

/// Builds the subscription token for a channel.
///
/// Presence channels require `presence_data`; its JSON is serialized
/// exactly once so the identical string feeds both the signature and
/// `channel_data`. Encrypted channels additionally carry the base64
/// per-channel shared secret and need the master key configured.
pub fn authorize_channel(
    token: &Token,
    master_key: Option<&EncryptionMasterKey>,
    channel: &str,
    socket_id: &str,
    presence_data: Option<&PresenceChannelData>,
) -> Result<SocketAuth> {
    let channel = Channel::parse(channel)?;
    validation::validate_socket_id(socket_id)?;

    match channel.kind() {
        ChannelKind::Presence => {
            let data = presence_data.ok_or_else(|| PusherError::MissingAuthData {
                message: format!(
                    "presence channel '{}' requires presence data",
                    channel.name()
                ),
            })?;
            let channel_data = serde_json::to_string(data)?;
            let to_sign = format!("{}:{}:{}", socket_id, channel.name(), channel_data);
            Ok(SocketAuth {
                auth: format_auth(token, &to_sign),
                channel_data: Some(channel_data),
                shared_secret: None,
            })
        }
        ChannelKind::PrivateEncrypted => {
            let master_key = master_key.ok_or_else(|| PusherError::Encryption {
                message: "Cannot generate shared_secret because the encryption master key is not set"
                    .to_string(),
            })?;
            let shared_secret = crypto::derive_shared_secret(master_key, channel.name());
            let to_sign = format!("{}:{}", socket_id, channel.name());
            Ok(SocketAuth {
                auth: format_auth(token, &to_sign),
                channel_data: None,
                shared_secret: Some(BASE64.encode(shared_secret)),
            })
        }
        ChannelKind::Public | ChannelKind::Private => {
            let to_sign = format!("{}:{}", socket_id, channel.name());
            Ok(SocketAuth {
                auth: format_auth(token, &to_sign),
                channel_data: None,
                shared_secret: None,
            })
        }
    }
}

/// Builds the sign-in token for a user. The signing domain is separated
/// from channel authorization by the `::user::` marker.
pub fn authenticate_user(token: &Token, socket_id: &str, user_data: &UserData) -> Result<UserAuth> {
    validation::validate_socket_id(socket_id)?;
    validation::validate_user_id(&user_data.id)?;

    let user_data = serde_json::to_string(user_data)?;
    let to_sign = format!("{}::user::{}", socket_id, user_data);
    Ok(UserAuth {
        auth: format_auth(token, &to_sign),
        user_data,
    })
}

fn format_auth(token: &Token, to_sign: &str) -> String {
    format!("{}:{}", token.key, token.sign(to_sign))
}
