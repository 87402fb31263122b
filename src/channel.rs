//! Channel names and their classification.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::{PusherError, Result};

/// Longest permitted channel name, prefix included.
pub const MAX_CHANNEL_NAME_LENGTH: usize = 164;

static CHANNEL_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-=@,.;]+$").unwrap());

/// Channel classification, derived once from the name prefix. The prefix
/// drives authorization and encryption branching; it is never stored
/// separately from the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Public,
    Private,
    Presence,
    PrivateEncrypted,
}

impl ChannelKind {
    /// Classifies a channel name by its prefix.
    pub fn of(name: &str) -> Self {
        if name.starts_with("private-encrypted-") {
            ChannelKind::PrivateEncrypted
        } else if name.starts_with("presence-") {
            ChannelKind::Presence
        } else if name.starts_with("private-") {
            ChannelKind::Private
        } else {
            ChannelKind::Public
        }
    }
}

/// A validated channel name together with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    name: String,
    kind: ChannelKind,
}

impl Channel {
    /// Parses and validates a channel name, classifying it by prefix.
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_channel_name(&name)?;
        let kind = ChannelKind::of(&name);
        Ok(Self { name, kind })
    }

    /// The full channel name, prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Whether subscribing to this channel requires an authorization token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self.kind, ChannelKind::Public)
    }

    /// Whether payloads on this channel are end-to-end encrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.kind, ChannelKind::PrivateEncrypted)
    }

    /// Consumes self and returns the inner String
    pub fn into_name(self) -> String {
        self.name
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl FromStr for Channel {
    type Err = PusherError;

    fn from_str(s: &str) -> Result<Self> {
        Channel::parse(s)
    }
}

/// Validates a channel name: the length limit is checked first, then the
/// grammar. The grammar covers the whole name, prefix included, as a
/// single-line full match.
pub fn validate_channel_name(name: &str) -> Result<()> {
    if name.len() > MAX_CHANNEL_NAME_LENGTH {
        return Err(PusherError::ChannelNameLength {
            name: name.to_string(),
            length: name.len(),
        });
    }

    if !CHANNEL_NAME_PATTERN.is_match(name) {
        return Err(PusherError::ChannelNameFormat {
            name: name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_detection() {
        assert_eq!(Channel::parse("news").unwrap().kind(), ChannelKind::Public);
        assert_eq!(
            Channel::parse("private-news").unwrap().kind(),
            ChannelKind::Private
        );
        assert_eq!(
            Channel::parse("presence-news").unwrap().kind(),
            ChannelKind::Presence
        );
        assert_eq!(
            Channel::parse("private-encrypted-news").unwrap().kind(),
            ChannelKind::PrivateEncrypted
        );
    }

    #[test]
    fn test_requires_auth() {
        assert!(!Channel::parse("news").unwrap().requires_auth());
        assert!(Channel::parse("private-news").unwrap().requires_auth());
        assert!(Channel::parse("presence-news").unwrap().requires_auth());
        assert!(Channel::parse("private-encrypted-news").unwrap().requires_auth());
    }

    #[test]
    fn test_length_boundary() {
        assert!(validate_channel_name(&"a".repeat(MAX_CHANNEL_NAME_LENGTH)).is_ok());

        let err = validate_channel_name(&"a".repeat(MAX_CHANNEL_NAME_LENGTH + 1)).unwrap_err();
        assert!(matches!(
            err,
            PusherError::ChannelNameLength { length: 165, .. }
        ));
    }

    #[test]
    fn test_length_is_checked_before_format() {
        // 165 chars that would also fail the grammar still report length.
        let name = format!("{}:", "a".repeat(MAX_CHANNEL_NAME_LENGTH));
        assert!(matches!(
            validate_channel_name(&name).unwrap_err(),
            PusherError::ChannelNameLength { .. }
        ));
    }

    #[test]
    fn test_format_violations() {
        for name in [
            "private-channel:",
            "has space",
            "tab\tchannel",
            "new\nline",
            "",
            "emoji-🙂",
        ] {
            let err = validate_channel_name(name).unwrap_err();
            assert!(
                matches!(err, PusherError::ChannelNameFormat { .. }),
                "expected format error for {:?}",
                name
            );
        }
    }

    #[test]
    fn test_full_grammar_alphabet() {
        assert!(validate_channel_name("private-ABC_xyz-09=@,.;").is_ok());
    }

    #[test]
    fn test_from_str_round_trip() {
        let channel: Channel = "presence-room-1".parse().unwrap();
        assert_eq!(channel.to_string(), "presence-room-1");
        assert_eq!(channel.into_name(), "presence-room-1");
    }
}
