use url::Url;

use crate::OAuthError;

const AUTHORIZE_PATH: &str = "oauth/authorize";
const TOKEN_PATH: &str = "oauth/token";
const USER_PATH: &str = "api/v4/user";
const PROJECTS_PATH: &str = "api/v4/projects";

const PROJECTS_QUERY: &[(&str, &str)] = &[("membership", "true")];

/// Provider URLs resolved against a GitLab instance root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitLabEndpoints {
    pub authorize: Url,
    pub token: Url,
    pub user: Url,
    pub projects: Url,
}

impl GitLabEndpoints {
    pub fn new(base_url: &str) -> Result<Self, OAuthError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut projects = base.join(PROJECTS_PATH)?;
        projects.query_pairs_mut().extend_pairs(PROJECTS_QUERY);

        Ok(Self {
            authorize: base.join(AUTHORIZE_PATH)?,
            token: base.join(TOKEN_PATH)?,
            user: base.join(USER_PATH)?,
            projects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::GitLabEndpoints;

    #[test]
    fn resolves_gitlab_com_endpoints() {
        let endpoints = GitLabEndpoints::new("https://gitlab.com").unwrap();
        assert_eq!(
            endpoints.authorize.as_str(),
            "https://gitlab.com/oauth/authorize"
        );
        assert_eq!(endpoints.token.as_str(), "https://gitlab.com/oauth/token");
        assert_eq!(endpoints.user.as_str(), "https://gitlab.com/api/v4/user");
        assert_eq!(
            endpoints.projects.as_str(),
            "https://gitlab.com/api/v4/projects?membership=true"
        );
    }

    #[test]
    fn keeps_instance_path_prefix() {
        let endpoints = GitLabEndpoints::new("https://example.org/gitlab").unwrap();
        assert_eq!(
            endpoints.token.as_str(),
            "https://example.org/gitlab/oauth/token"
        );
    }
}
