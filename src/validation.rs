//! Grammars and limits for the values that feed signing strings.

use std::sync::LazyLock;

use regex::Regex;

use crate::{PusherError, Result};

/// Longest permitted event name.
pub const MAX_EVENT_NAME_LENGTH: usize = 200;

/// Longest permitted user id.
pub const MAX_USER_ID_LENGTH: usize = 200;

// Pre-compiled patterns; both are full-string matches.
static SOCKET_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

static USER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-=@,.;]+$").unwrap());

/// Validates a socket id against the `\d+.\d+` grammar. Surrounding
/// whitespace, newlines, colons and trailing characters all fail.
pub fn validate_socket_id(socket_id: &str) -> Result<()> {
    if !SOCKET_ID_PATTERN.is_match(socket_id) {
        return Err(PusherError::SocketIdFormat {
            socket_id: socket_id.to_string(),
        });
    }
    Ok(())
}

/// Validates a user id.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(PusherError::Validation {
            message: "User id cannot be empty".to_string(),
        });
    }

    if user_id.len() > MAX_USER_ID_LENGTH {
        return Err(PusherError::Validation {
            message: format!(
                "User id too long: '{}' (max {} characters)",
                user_id, MAX_USER_ID_LENGTH
            ),
        });
    }

    if !USER_ID_PATTERN.is_match(user_id) {
        return Err(PusherError::Validation {
            message: format!(
                "Invalid user id: '{}'. Must match pattern: [a-zA-Z0-9_\\-=@,.;]+",
                user_id
            ),
        });
    }

    Ok(())
}

/// Validates an event name.
pub fn validate_event_name(name: &str) -> Result<()> {
    if name.len() > MAX_EVENT_NAME_LENGTH {
        return Err(PusherError::Validation {
            message: format!(
                "Event name too long: '{}' (max {} characters)",
                name, MAX_EVENT_NAME_LENGTH
            ),
        });
    }
    Ok(())
}

/// Applies the caller-configured payload size policy, if any. This is a
/// local policy knob, not a protocol constant.
pub fn validate_event_data_size(data: &str, limit: Option<usize>) -> Result<()> {
    if let Some(limit) = limit {
        if data.len() > limit {
            return Err(PusherError::DataTooLarge {
                size: data.len(),
                limit,
            });
        }
    }
    Ok(())
}
