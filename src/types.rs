use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::redacted;

/// Authenticated user object from `GET /api/v4/user`, passed through as-is.
pub type UserProfile = Value;

/// Project array from `GET /api/v4/projects?membership=true`, passed through as-is.
pub type RepositoryList = Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationRequest {
    pub authorization_url: String,
    pub state: String,
    pub scope: String,
}

/// Token endpoint payload.
///
/// Only `access_token` is required; every other field is kept exactly as the
/// provider sent it, nulls and unusual types included.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenResponse {
    pub fn token_type(&self) -> Option<&str> {
        self.extra.get("token_type").and_then(Value::as_str)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.extra.get("refresh_token").and_then(Value::as_str)
    }

    pub fn expires_in(&self) -> Option<u64> {
        self.extra.get("expires_in").and_then(Value::as_u64)
    }

    pub fn scope(&self) -> Option<&str> {
        self.extra.get("scope").and_then(Value::as_str)
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &redacted(&self.access_token))
            .field("token_type", &self.token_type())
            .field("expires_in", &self.expires_in())
            .field("scope", &self.scope())
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}
