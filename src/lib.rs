//! Pusher Channels HTTP API client for Rust
//!
//! Signs REST requests, authorizes private/presence/encrypted channel
//! subscriptions and user sign-ins, encrypts payloads for
//! private-encrypted channels, and validates inbound webhooks.

pub mod auth;
pub mod channel;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod events;
pub mod pusher;
pub mod signer;
pub mod token;
pub mod validation;
pub mod webhook;

pub use auth::{PresenceChannelData, SocketAuth, UserAuth, UserData};
pub use channel::{Channel, ChannelKind};
pub use config::Config;
pub use crypto::EncryptionMasterKey;
pub use errors::{PusherError, RequestError};
pub use events::{BatchEvent, TriggerParams};
pub use pusher::Pusher;
pub use signer::SignedRequest;
pub use token::Token;
pub use webhook::{WebhookEvent, WebhookResult, WebhookValidator};

/// Result type alias for Pusher operations
pub type Result<T> = std::result::Result<T, PusherError>;
