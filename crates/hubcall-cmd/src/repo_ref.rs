//! Repository references on the command line.
//!
//! Accepts `OWNER/REPO`, a repository URL, or nothing at all, in which case
//! the configured default owner and repository are used.

use std::fmt;

use hubcall_api::RequestDescriptor;
use hubcall_core::Settings;
use url::Url;

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    /// Create a reference from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `OWNER/REPO` string or a repository URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the string names no repository.
    pub fn parse(input: &str) -> Result<Self, RepoParseError> {
        let input = input.trim();
        if input.starts_with("https://") || input.starts_with("http://") {
            let url = Url::parse(input).map_err(|_| RepoParseError::InvalidUrl(input.to_string()))?;
            return Self::from_url(&url);
        }

        match input.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self::new(*owner, *name)),
            _ => Err(RepoParseError::InvalidFormat(input.to_string())),
        }
    }

    /// Extract owner and name from a repository URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL path has fewer than two segments.
    pub fn from_url(u: &Url) -> Result<Self, RepoParseError> {
        let path = u.path().trim_start_matches('/').trim_end_matches(".git");
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        match (parts.next(), parts.next()) {
            (Some(owner), Some(name)) => Ok(Self::new(owner, name.trim_end_matches(".git"))),
            _ => Err(RepoParseError::InvalidUrl(u.to_string())),
        }
    }

    /// Resolve an optional command-line value against the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is malformed, or if it is absent and no
    /// default repository is configured.
    pub fn resolve(input: Option<&str>, settings: &Settings) -> Result<Self, RepoParseError> {
        if let Some(input) = input {
            return Self::parse(input);
        }
        match (
            settings.default_owner_name.as_deref(),
            settings.default_repository_name.as_deref(),
        ) {
            (Some(owner), Some(name)) => Ok(Self::new(owner, name)),
            _ => Err(RepoParseError::Missing),
        }
    }

    /// Resolve only an owner: an explicit value or the configured default.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is available.
    pub fn resolve_owner(input: Option<&str>, settings: &Settings) -> Result<String, RepoParseError> {
        input
            .filter(|o| !o.is_empty())
            .or(settings.default_owner_name.as_deref())
            .map(str::to_string)
            .ok_or(RepoParseError::MissingOwner)
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URI fragment for the repository, `repos/OWNER/REPO`.
    pub fn api_path(&self) -> String {
        format!(
            "repos/{}/{}",
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.name)
        )
    }

    /// Tag a request with this repository's telemetry properties.
    pub fn tag(&self, req: RequestDescriptor) -> RequestDescriptor {
        req.with_telemetry_property("OwnerName", self.owner.as_str())
            .with_telemetry_property("RepositoryName", self.name.as_str())
    }

    /// Web URL of the repository on `host`.
    pub fn html_url(&self, host: &str) -> String {
        format!("https://{host}/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Errors from resolving repository references.
#[derive(Debug, thiserror::Error)]
pub enum RepoParseError {
    /// String does not match `OWNER/REPO`.
    #[error("expected OWNER/REPO format, got {0:?}")]
    InvalidFormat(String),
    /// URL does not contain repository information.
    #[error("cannot extract repository from URL: {0}")]
    InvalidUrl(String),
    /// No repository given and none configured.
    #[error("no repository given; pass -R OWNER/REPO or set default_owner_name and default_repository_name")]
    Missing,
    /// No owner given and none configured.
    #[error("no owner given; pass --owner or set default_owner_name")]
    MissingOwner,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("cli/cli", "cli", "cli")]
    #[case("my-org/my.repo", "my-org", "my.repo")]
    #[case("https://github.com/octocat/hello-world", "octocat", "hello-world")]
    #[case("https://ghe.example.com/team/tools.git", "team", "tools")]
    #[case("https://github.com/octocat/hello-world/issues/3", "octocat", "hello-world")]
    fn test_should_parse_repo(#[case] input: &str, #[case] owner: &str, #[case] name: &str) {
        let repo = RepoRef::parse(input).unwrap();
        assert_eq!(repo.owner(), owner);
        assert_eq!(repo.name(), name);
    }

    #[rstest]
    #[case("")]
    #[case("justowner")]
    #[case("/repo")]
    #[case("a/b/c")]
    #[case("https://github.com/onlyowner")]
    fn test_should_reject_malformed_repo(#[case] input: &str) {
        assert!(RepoRef::parse(input).is_err());
    }

    #[test]
    fn test_should_fall_back_to_configured_defaults() {
        let mut settings = Settings::default();
        assert!(matches!(
            RepoRef::resolve(None, &settings),
            Err(RepoParseError::Missing)
        ));

        settings.default_owner_name = Some("octo-org".to_string());
        settings.default_repository_name = Some("tools".to_string());
        assert_eq!(
            RepoRef::resolve(None, &settings).unwrap(),
            RepoRef::new("octo-org", "tools")
        );
        assert_eq!(
            RepoRef::resolve(Some("a/b"), &settings).unwrap(),
            RepoRef::new("a", "b")
        );
    }

    #[test]
    fn test_should_resolve_owner() {
        let mut settings = Settings::default();
        assert!(RepoRef::resolve_owner(None, &settings).is_err());
        settings.default_owner_name = Some("octo-org".to_string());
        assert_eq!(RepoRef::resolve_owner(None, &settings).unwrap(), "octo-org");
        assert_eq!(RepoRef::resolve_owner(Some("me"), &settings).unwrap(), "me");
    }

    #[test]
    fn test_should_encode_api_path() {
        let repo = RepoRef::new("octocat", "hello world");
        assert_eq!(repo.api_path(), "repos/octocat/hello%20world");
        assert_eq!(repo.to_string(), "octocat/hello world");
        assert_eq!(
            repo.html_url("github.com"),
            "https://github.com/octocat/hello world"
        );
    }

    #[test]
    fn test_should_tag_request_with_repository() {
        let req = RepoRef::new("octocat", "hello").tag(RequestDescriptor::get("x"));
        assert_eq!(req.telemetry.properties["OwnerName"], "octocat");
        assert_eq!(req.telemetry.properties["RepositoryName"], "hello");
    }
}
