use std::fmt;
use std::time::Duration;

use url::Url;

use crate::OAuthError;

pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";
pub const DEFAULT_SCOPE: &str = "read_user read_api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_CLIENT_ID: &str = "GITLAB_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GITLAB_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "GITLAB_REDIRECT_URI";
pub const ENV_SCOPE: &str = "GITLAB_SCOPE";
pub const ENV_BASE_URL: &str = "GITLAB_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "GITLAB_HTTP_TIMEOUT_SECS";

/// Static client credentials and provider settings, built once at startup.
#[derive(Clone)]
pub struct GitLabConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GitLabConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// Missing credentials are not an error here: they are logged and left
    /// empty, and the provider rejects them when a request is made.
    pub fn from_env() -> Result<Self, OAuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, OAuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| match lookup(name) {
            Some(value) => value,
            None => {
                tracing::warn!(variable = name, "environment variable is not set");
                String::new()
            }
        };

        let mut config = Self::new(
            required(ENV_CLIENT_ID),
            required(ENV_CLIENT_SECRET),
            required(ENV_REDIRECT_URI),
        );

        if let Some(scope) = lookup(ENV_SCOPE).filter(|scope| !scope.trim().is_empty()) {
            config.scope = scope;
        }

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&base_url).map_err(|err| match err {
                OAuthError::InvalidConfig { message, .. } => OAuthError::InvalidConfig {
                    name: ENV_BASE_URL,
                    message,
                },
                other => other,
            })?;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| OAuthError::InvalidConfig {
                name: ENV_TIMEOUT_SECS,
                message: format!("expected a whole number of seconds, got {raw:?}"),
            })?;
            if secs == 0 {
                return Err(OAuthError::InvalidConfig {
                    name: ENV_TIMEOUT_SECS,
                    message: "timeout must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, OAuthError> {
        let url = Url::parse(base_url)?;
        if url.cannot_be_a_base() {
            return Err(OAuthError::InvalidConfig {
                name: "base_url",
                message: format!("{base_url} cannot be used as a base url"),
            });
        }
        self.base_url = url.to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub(crate) fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "<empty>" } else { "<redacted>" }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_credentials_and_defaults() {
        let config = GitLabConfig::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "abc"),
            (ENV_CLIENT_SECRET, "shh"),
            (ENV_REDIRECT_URI, "https://app/cb"),
        ]))
        .unwrap();

        assert_eq!(config.client_id, "abc");
        assert_eq!(config.client_secret, "shh");
        assert_eq!(config.redirect_uri, "https://app/cb");
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn from_lookup_tolerates_missing_credentials() {
        let config = GitLabConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.client_id.is_empty());
        assert!(config.client_secret.is_empty());
        assert!(config.redirect_uri.is_empty());
    }

    #[test]
    fn from_lookup_applies_overrides() {
        let config = GitLabConfig::from_lookup(lookup(&[
            (ENV_SCOPE, "read_user"),
            (ENV_BASE_URL, "https://gitlab.example.org/"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.scope, "read_user");
        assert_eq!(config.base_url, "https://gitlab.example.org/");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let result = GitLabConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")]));
        assert!(matches!(
            result,
            Err(OAuthError::InvalidConfig {
                name: ENV_TIMEOUT_SECS,
                ..
            })
        ));

        let result = GitLabConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn base_url_errors_name_their_source() {
        let result = GitLabConfig::new("abc", "", "").with_base_url("mailto:ops@example.org");
        assert!(matches!(
            result,
            Err(OAuthError::InvalidConfig {
                name: "base_url",
                ..
            })
        ));

        let result = GitLabConfig::from_lookup(lookup(&[(ENV_BASE_URL, "mailto:ops@example.org")]));
        assert!(matches!(
            result,
            Err(OAuthError::InvalidConfig {
                name: ENV_BASE_URL,
                ..
            })
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = GitLabConfig::new("abc", "super-secret", "https://app/cb");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
