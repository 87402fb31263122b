use thiserror::Error;

#[derive(Error, Debug)]
pub enum PusherError {
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Channel name too long: {length} characters (max 164): '{name}'")]
    ChannelNameLength { name: String, length: usize },

    #[error("Invalid channel name: '{name}'. Must match pattern: [A-Za-z0-9_\\-=@,.;]+")]
    ChannelNameFormat { name: String },

    #[error("Invalid socket id: '{socket_id}'. Must be in format: \\d+.\\d+")]
    SocketIdFormat { socket_id: String },

    #[error("Too many events in batch: {count} (max {max})")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Event data too large: {size} bytes (limit {limit})")]
    DataTooLarge { size: usize, limit: usize },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Missing authorization data: {message}")]
    MissingAuthData { message: String },

    #[error("Encryption error: {message}")]
    Encryption { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
#[error("HTTP request failed: {message} ({url})")]
pub struct RequestError {
    pub message: String,
    pub url: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl RequestError {
    pub fn new(
        message: impl Into<String>,
        url: impl Into<String>,
        status: Option<u16>,
        body: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            url: url.into(),
            status,
            body,
        }
    }
}
