//! GitHub REST API release source
//!
//! API endpoint:
//! - List releases: https://api.github.com/repos/{org}/{repo}/releases?per_page=1

use crate::error::SourceError;
use crate::oracle::{HttpClient, Release, ReleaseSource};
use async_trait::async_trait;
use serde::Deserialize;

/// GitHub API base URL
const GITHUB_API_URL: &str = "https://api.github.com";

/// Release source backed by the GitHub REST API
pub struct GitHubApiSource {
    client: HttpClient,
    base_url: String,
}

/// Release entry in the list response
#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    tag_name: String,
    #[serde(default)]
    draft: bool,
}

impl GitHubApiSource {
    /// Create a new GitHub API source
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: GITHUB_API_URL.to_string(),
        }
    }

    /// Point the source at another API host (GitHub Enterprise)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_list_url(&self, org: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/releases?per_page=1", self.base_url, org, repo)
    }
}

#[async_trait]
impl ReleaseSource for GitHubApiSource {
    fn source_name(&self) -> &'static str {
        "GitHub API"
    }

    async fn latest_release(&self, org: &str, repo: &str) -> Result<Option<Release>, SourceError> {
        let url = self.build_list_url(org, repo);
        let slug = format!("{}/{}", org, repo);
        let releases: Vec<ReleaseResponse> = self
            .client
            .get_json(&url, &slug, self.source_name())
            .await?;

        Ok(releases
            .into_iter()
            .find(|r| !r.draft && !r.tag_name.trim().is_empty())
            .map(|r| Release::new(r.tag_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        let source = GitHubApiSource::new(HttpClient::new().unwrap());
        assert_eq!(source.source_name(), "GitHub API");
    }

    #[test]
    fn test_build_list_url() {
        let source = GitHubApiSource::new(HttpClient::new().unwrap());
        assert_eq!(
            source.build_list_url("livetemplate", "lvt"),
            "https://api.github.com/repos/livetemplate/lvt/releases?per_page=1"
        );
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let source = GitHubApiSource::new(HttpClient::new().unwrap())
            .with_base_url("https://ghe.example.com/api/v3/");
        assert_eq!(
            source.build_list_url("acme", "core"),
            "https://ghe.example.com/api/v3/repos/acme/core/releases?per_page=1"
        );
    }

    #[test]
    fn test_parse_release_response() {
        let json = r#"[{"tag_name": "v1.4.2", "draft": false, "published_at": "2025-01-01T00:00:00Z"}]"#;
        let releases: Vec<ReleaseResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(releases[0].tag_name, "v1.4.2");
        assert!(!releases[0].draft);
    }
}
