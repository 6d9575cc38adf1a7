use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable session. The app shell should send the user to login.
    #[error("Authentication required")]
    AuthRequired,
    /// The server rejected the token as invalid or expired.
    #[error("Authentication expired")]
    AuthExpired,
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    /// Any other non-success response, with the server's message.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Secure storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Auth failures redirect silently; everything else is shown to the user.
    pub fn needs_login(&self) -> bool {
        matches!(self, ClientError::AuthRequired | ClientError::AuthExpired)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}
