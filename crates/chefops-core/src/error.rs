use thiserror::Error;

/// Result type alias for chefops operations
pub type Result<T> = std::result::Result<T, ChefopsError>;

/// Errors that can occur while fetching data or running external tools
#[derive(Error, Debug)]
pub enum ChefopsError {
    /// Authentication failed - invalid or missing token
    #[error("authentication failed: invalid or missing token")]
    Unauthorized,

    /// Resource not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// URL does not name a GitHub repository
    #[error("repository name cannot be inferred from URL: {0}")]
    InvalidRepoUrl(String),

    /// External command failed or could not be started
    #[error("command `{command}` failed: {message}")]
    Command {
        /// The command line that was run
        command: String,
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChefopsError {
    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns the HTTP status code if this is an API error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Shorthand for a failed external command
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }
}
