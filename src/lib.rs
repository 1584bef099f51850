//! GitLab OAuth 2.0 authorization code client.
//!
//! Four stateless operations (authorization URL, code exchange, user profile,
//! member projects) are available on [`GitLabOAuthClient`], and wrapped by
//! [`GitLabTools`] for hosts that expect tool calls which always return a
//! tagged result.

mod client;
pub mod config;
mod error;
mod provider;
pub mod tools;
mod types;

pub use client::GitLabOAuthClient;
pub use config::GitLabConfig;
pub use error::{ErrorKind, OAuthError};
pub use provider::GitLabEndpoints;
pub use tools::{GitLabTools, ToolDefinition, ToolError, ToolResult};
pub use types::{AuthorizationRequest, RepositoryList, TokenResponse, UserProfile};
