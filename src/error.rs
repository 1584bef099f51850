use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String, body: String },

    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("invalid configuration value {name}: {message}")]
    InvalidConfig { name: &'static str, message: String },

    #[error("access token cannot be sent as a bearer header")]
    InvalidAccessToken,

    #[error("invalid arguments for tool {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// Coarse classification of an [`OAuthError`], reported to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    InvalidInput,
    Transport,
    Provider,
    MalformedResponse,
}

impl OAuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Url(_) | Self::MissingConfig(_) | Self::InvalidConfig { .. } => {
                ErrorKind::Configuration
            }
            Self::InvalidAccessToken | Self::InvalidArguments { .. } | Self::UnknownTool(_) => {
                ErrorKind::InvalidInput
            }
            Self::Http(_) => ErrorKind::Transport,
            Self::HttpStatus { .. } => ErrorKind::Provider,
            Self::InvalidResponse { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// HTTP status returned by the provider, when the failure came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Human-readable description for tool callers. Never empty.
    ///
    /// Provider rejections in the OAuth error shape (`error` and
    /// `error_description`) are summarised instead of echoing the raw body.
    pub fn description(&self) -> String {
        match self {
            Self::HttpStatus { status, body } => match ProviderErrorBody::parse(body) {
                Some(provider) => format!("http status {status}: {}", provider.summary()),
                None if body.trim().is_empty() => format!("http status {status}"),
                None => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<serde_json::Value>,
}

impl ProviderErrorBody {
    fn parse(body: &str) -> Option<Self> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        if parsed.error.is_none() && parsed.message.is_none() {
            return None;
        }
        Some(parsed)
    }

    fn summary(&self) -> String {
        let message = match &self.message {
            Some(serde_json::Value::String(message)) => Some(message.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        };
        match (&self.error, &self.error_description, message) {
            (Some(error), Some(description), _) => format!("{error} ({description})"),
            (Some(error), None, _) => error.clone(),
            (None, Some(description), _) => description.clone(),
            (None, None, Some(message)) => message,
            (None, None, None) => "unknown provider error".to_string(),
        }
    }
}
