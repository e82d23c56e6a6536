#[derive(Debug)]
/// An error that can occur when interacting with the client.
pub enum ClientError {
    /// The server could not be reached, or did not answer in time.
    ConnectionError(String),
    /// Any other error that occurred when making a request.
    ReqwestError(reqwest::Error),
    /// An error that occurred when deserializing a response.
    DeserializationError(serde_json::Error),
    /// The server answered with a non-success status.
    StatusError {
        /// The HTTP status code.
        status: u16,
        /// The error message reported by the server, if any.
        message: Option<String>,
    },
}
impl ClientError {
    /// The HTTP status of the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::StatusError { status, .. } => Some(*status),
            ClientError::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The error message reported by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::StatusError { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::ConnectionError(e) => write!(f, "Connection error: {e}"),
            ClientError::ReqwestError(e) => write!(f, "Reqwest error: {e}"),
            ClientError::DeserializationError(e) => write!(f, "Deserialization error: {e}"),
            ClientError::StatusError { status, message } => {
                write!(f, "Catalog error: HTTP {status}")?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
        }
    }
}
impl std::error::Error for ClientError {}
impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ClientError::ConnectionError(e.to_string())
        } else {
            ClientError::ReqwestError(e)
        }
    }
}
impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::DeserializationError(e)
    }
}
/// A result type for the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// A client for the catalog Web API.
pub struct Client {
    pub(crate) api_url: String,
    pub(crate) token_url: String,
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) client: reqwest::Client,
}
impl Client {
    /// The catalog API base URL used when none is configured.
    pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
    /// The token endpoint used when none is configured.
    pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

    /// Create a new client.
    pub fn new(
        api_url: impl Into<String>,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            client: reqwest::Client::new(),
        }
    }
}
