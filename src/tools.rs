//! Host-facing tool surface.
//!
//! Every tool returns a [`ToolResult`]; failures are reported in-band and
//! never escape as `Err` or panics, so one failed call leaves the next one
//! unaffected.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    ErrorKind, GitLabConfig, GitLabOAuthClient, OAuthError, RepositoryList, TokenResponse,
    UserProfile,
};

pub const TOOL_AUTHORIZATION_URL: &str = "get_authorization_url";
pub const TOOL_EXCHANGE_CODE: &str = "exchange_code_for_token";
pub const TOOL_USER_INFO: &str = "get_user_info";
pub const TOOL_USER_REPOS: &str = "get_user_repos";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult<T> {
    Ok { data: T },
    Error { error: ToolError },
}

impl<T> ToolResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ok { data } => Some(data),
            Self::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match self {
            Self::Ok { .. } => None,
            Self::Error { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, ToolError> {
        match self {
            Self::Ok { data } => Ok(data),
            Self::Error { error } => Err(error),
        }
    }

    fn from_result(tool: &str, result: Result<T, OAuthError>) -> Self {
        match result {
            Ok(data) => {
                tracing::info!(tool, "tool call succeeded");
                Self::Ok { data }
            }
            Err(err) => {
                tracing::error!(tool, kind = ?err.kind(), error = %err, "tool call failed");
                Self::Error {
                    error: ToolError::from(&err),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl From<&OAuthError> for ToolError {
    fn from(err: &OAuthError) -> Self {
        Self {
            kind: err.kind(),
            message: err.description(),
            http_status: err.http_status(),
        }
    }
}

/// Name, description and JSON input schema of one callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct StateArgs {
    state: String,
}

#[derive(Debug, Deserialize)]
struct CodeArgs {
    code: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenArgs {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct GitLabTools {
    client: GitLabOAuthClient,
}

impl GitLabTools {
    pub fn new(client: GitLabOAuthClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: GitLabConfig) -> Result<Self, OAuthError> {
        Ok(Self::new(GitLabOAuthClient::new(config)?))
    }

    pub fn client(&self) -> &GitLabOAuthClient {
        &self.client
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            definition(
                TOOL_AUTHORIZATION_URL,
                "Generate the GitLab OAuth authorization URL for the given state value.",
                "state",
                "Opaque value echoed back on the redirect; the caller verifies it.",
            ),
            definition(
                TOOL_EXCHANGE_CODE,
                "Exchange an authorization code for an access token.",
                "code",
                "Authorization code from the GitLab redirect callback.",
            ),
            definition(
                TOOL_USER_INFO,
                "Fetch the profile of the user who owns the access token.",
                "access_token",
                "Bearer token returned by exchange_code_for_token.",
            ),
            definition(
                TOOL_USER_REPOS,
                "List the projects the token owner is a member of.",
                "access_token",
                "Bearer token returned by exchange_code_for_token.",
            ),
        ]
    }

    pub fn get_authorization_url(&self, state: &str) -> ToolResult<String> {
        let result = self
            .client
            .authorization_url(state)
            .map(|auth| auth.authorization_url);
        ToolResult::from_result(TOOL_AUTHORIZATION_URL, result)
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> ToolResult<TokenResponse> {
        let result = self.client.exchange_code(code).await;
        ToolResult::from_result(TOOL_EXCHANGE_CODE, result)
    }

    pub async fn get_user_info(&self, access_token: &str) -> ToolResult<UserProfile> {
        let result = self.client.user_info(access_token).await;
        ToolResult::from_result(TOOL_USER_INFO, result)
    }

    pub async fn get_user_repos(&self, access_token: &str) -> ToolResult<RepositoryList> {
        let result = self.client.user_repos(access_token).await;
        ToolResult::from_result(TOOL_USER_REPOS, result)
    }

    /// Dispatches a tool call by name with JSON arguments.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        tracing::debug!(tool = name, "dispatching tool call");
        match name {
            TOOL_AUTHORIZATION_URL => match parse_args::<StateArgs>(name, arguments) {
                Ok(args) => to_value(self.get_authorization_url(&args.state)),
                Err(err) => ToolResult::from_result(name, Err(err)),
            },
            TOOL_EXCHANGE_CODE => match parse_args::<CodeArgs>(name, arguments) {
                Ok(args) => to_value(self.exchange_code_for_token(&args.code).await),
                Err(err) => ToolResult::from_result(name, Err(err)),
            },
            TOOL_USER_INFO => match parse_args::<AccessTokenArgs>(name, arguments) {
                Ok(args) => self.get_user_info(&args.access_token).await,
                Err(err) => ToolResult::from_result(name, Err(err)),
            },
            TOOL_USER_REPOS => match parse_args::<AccessTokenArgs>(name, arguments) {
                Ok(args) => self.get_user_repos(&args.access_token).await,
                Err(err) => ToolResult::from_result(name, Err(err)),
            },
            _ => ToolResult::from_result(name, Err(OAuthError::UnknownTool(name.to_string()))),
        }
    }
}

fn definition(
    name: &str,
    description: &str,
    argument: &str,
    argument_description: &str,
) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                argument: {
                    "type": "string",
                    "description": argument_description
                }
            },
            "required": [argument]
        }),
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, OAuthError> {
    serde_json::from_value(arguments).map_err(|err| OAuthError::InvalidArguments {
        tool: tool.to_string(),
        message: err.to_string(),
    })
}

fn to_value<T: Serialize>(result: ToolResult<T>) -> ToolResult<Value> {
    match result {
        ToolResult::Ok { data } => match serde_json::to_value(data) {
            Ok(data) => ToolResult::Ok { data },
            Err(err) => ToolResult::Error {
                error: ToolError {
                    kind: ErrorKind::MalformedResponse,
                    message: err.to_string(),
                    http_status: None,
                },
            },
        },
        ToolResult::Error { error } => ToolResult::Error { error },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tools() -> GitLabTools {
        let config = GitLabConfig::new("abc", "secret", "https://app/cb").with_scope("read_user");
        GitLabTools::from_config(config).unwrap()
    }

    #[test]
    fn definitions_cover_all_tools() {
        let names: Vec<_> = GitLabTools::definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect();
        assert_eq!(
            names,
            [
                TOOL_AUTHORIZATION_URL,
                TOOL_EXCHANGE_CODE,
                TOOL_USER_INFO,
                TOOL_USER_REPOS
            ]
        );
    }

    #[test]
    fn definition_schema_requires_argument() {
        let definitions = GitLabTools::definitions();
        let exchange = &definitions[1];
        assert_eq!(exchange.input_schema["required"], json!(["code"]));
        assert_eq!(
            exchange.input_schema["properties"]["code"]["type"],
            json!("string")
        );
    }

    #[test]
    fn authorization_url_is_tagged_ok() {
        let result = tools().get_authorization_url("xyz123");
        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["status"], json!("ok"));
        assert!(
            serialized["data"]
                .as_str()
                .unwrap()
                .starts_with("https://gitlab.com/oauth/authorize?client_id=abc")
        );
    }

    #[test]
    fn missing_config_is_tagged_error() {
        let tools = GitLabTools::from_config(GitLabConfig::new("", "", "")).unwrap();
        let result = tools.get_authorization_url("xyz123");
        let error = result.error().unwrap();
        assert_eq!(error.kind, ErrorKind::Configuration);
        assert!(!error.message.is_empty());

        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["status"], json!("error"));
        assert_eq!(serialized["error"]["kind"], json!("configuration"));
    }

    #[tokio::test]
    async fn call_dispatches_by_name() {
        let result = tools()
            .call(TOOL_AUTHORIZATION_URL, json!({ "state": "a&b" }))
            .await;
        let url = result.data().and_then(Value::as_str).unwrap();
        assert!(url.contains("state=a%26b"));
    }

    #[tokio::test]
    async fn call_rejects_unknown_tool_and_bad_arguments() {
        let tools = tools();

        let unknown = tools.call("delete_everything", json!({})).await;
        assert_eq!(unknown.error().unwrap().kind, ErrorKind::InvalidInput);

        let bad = tools.call(TOOL_EXCHANGE_CODE, json!({ "state": 1 })).await;
        let error = bad.error().unwrap();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(error.message.contains(TOOL_EXCHANGE_CODE));
    }

    #[tokio::test]
    async fn invalid_bearer_token_fails_without_request() {
        let result = tools().get_user_info("bad\ntoken").await;
        assert_eq!(result.error().unwrap().kind, ErrorKind::InvalidInput);
    }
}
