use reqwest::{
    Client, RequestBuilder,
    header::{ACCEPT, AUTHORIZATION, HeaderValue},
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    AuthorizationRequest, GitLabConfig, GitLabEndpoints, OAuthError, RepositoryList,
    TokenResponse, UserProfile,
};

/// Stateless GitLab OAuth client. Each call makes at most one request.
#[derive(Debug, Clone)]
pub struct GitLabOAuthClient {
    config: GitLabConfig,
    endpoints: GitLabEndpoints,
    http: Client,
}

impl GitLabOAuthClient {
    pub fn new(config: GitLabConfig) -> Result<Self, OAuthError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Self::with_http_client(config, http)
    }

    pub fn with_http_client(config: GitLabConfig, http: Client) -> Result<Self, OAuthError> {
        let endpoints = GitLabEndpoints::new(&config.base_url)?;
        Ok(Self {
            config,
            endpoints,
            http,
        })
    }

    pub fn config(&self) -> &GitLabConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &GitLabEndpoints {
        &self.endpoints
    }

    /// Builds the browser-facing authorization URL.
    ///
    /// `state` is carried through untouched; verifying it on the callback is
    /// up to the caller.
    pub fn authorization_url(&self, state: &str) -> Result<AuthorizationRequest, OAuthError> {
        tracing::info!("building authorization url");

        if self.config.client_id.is_empty() {
            return Err(OAuthError::MissingConfig(crate::config::ENV_CLIENT_ID));
        }
        if self.config.redirect_uri.is_empty() {
            return Err(OAuthError::MissingConfig(crate::config::ENV_REDIRECT_URI));
        }

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("state", state),
            ("scope", self.config.scope.as_str()),
        ];

        let mut url = self.endpoints.authorize.clone();
        url.query_pairs_mut().clear().extend_pairs(params);

        tracing::info!(scope = %self.config.scope, "built authorization url");

        Ok(AuthorizationRequest {
            authorization_url: url.to_string(),
            state: state.to_string(),
            scope: self.config.scope.clone(),
        })
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        tracing::info!("exchanging authorization code for access token");

        let payload = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let builder = self
            .http
            .post(self.endpoints.token.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(&payload);

        let token: TokenResponse = send_json(builder).await?;

        tracing::info!(
            token_type = token.token_type().unwrap_or("unknown"),
            expires_in = token.expires_in(),
            scope = token.scope().unwrap_or(""),
            "access token retrieved"
        );

        Ok(token)
    }

    pub async fn user_info(&self, access_token: &str) -> Result<UserProfile, OAuthError> {
        tracing::info!("fetching authenticated user profile");
        let profile = self.get_with_bearer(&self.endpoints.user, access_token).await?;
        tracing::info!("user profile retrieved");
        Ok(profile)
    }

    pub async fn user_repos(&self, access_token: &str) -> Result<RepositoryList, OAuthError> {
        tracing::info!("fetching projects the user is a member of");
        let projects: RepositoryList = self
            .get_with_bearer(&self.endpoints.projects, access_token)
            .await?;
        tracing::info!(
            count = projects.as_array().map(Vec::len),
            "user projects retrieved"
        );
        Ok(projects)
    }

    async fn get_with_bearer<T: DeserializeOwned>(
        &self,
        url: &Url,
        access_token: &str,
    ) -> Result<T, OAuthError> {
        let builder = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, bearer(access_token)?)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        send_json(builder).await
    }
}

fn bearer(access_token: &str) -> Result<HeaderValue, OAuthError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {access_token}"))
        .map_err(|_| OAuthError::InvalidAccessToken)?;
    value.set_sensitive(true);
    Ok(value)
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, OAuthError> {
    let response = builder.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(OAuthError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|err| OAuthError::InvalidResponse {
        message: err.to_string(),
        body,
    })
}
