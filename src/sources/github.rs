//! GitHub GraphQL content fetcher.

use super::ContentFetcher;
use crate::core::{File, FileSet, Namespace};
use crate::error::{Result, WatcherError};
use async_trait::async_trait;
use reqwest::{Client, header::HeaderValue};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Public GitHub GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Lists a directory's blobs, with their oid and text, in one round trip.
const TREE_QUERY: &str = r#"query ($owner: String!, $name: String!, $expression: String!) {
  repository(owner: $owner, name: $name) {
    object(expression: $expression) {
      ... on Tree {
        entries {
          name
          object {
            ... on Blob {
              oid
              text
            }
          }
        }
      }
    }
  }
}"#;

/// Fetches configuration files through the GitHub GraphQL API (v4).
///
/// Every file directly under the namespace directory becomes one [`File`];
/// sub-directories are ignored.
///
/// # Examples
///
/// ```rust,no_run
/// use github_config_watcher::sources::GithubFetcher;
/// use std::time::Duration;
///
/// # fn example() -> github_config_watcher::error::Result<()> {
/// let fetcher = GithubFetcher::builder()
///     .with_token("ghp_secret")
///     .with_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GithubFetcher {
    endpoint: String,
    client: Client,
    token: String,
}

impl GithubFetcher {
    /// Create a new builder for constructing a GitHub fetcher.
    pub fn builder() -> GithubFetcherBuilder {
        GithubFetcherBuilder::new()
    }

    /// The GraphQL endpoint queries are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentFetcher for GithubFetcher {
    async fn fetch(&self, namespace: &Namespace) -> Result<FileSet> {
        let body = request_body(namespace);
        tracing::debug!(%namespace, expression = %namespace.expression(), "querying GitHub");

        let header_value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| WatcherError::Fetch(format!("Invalid bearer token: {}", e)))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", header_value)
            .json(&body)
            .send()
            .await
            .map_err(|e| WatcherError::Fetch(format!("failed to query Github API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatcherError::Fetch(format!(
                "Github API responded with status {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| WatcherError::Fetch(format!("Failed to parse Github response: {}", e)))?;

        files_from_response(parsed)
    }
}

/// Builder for constructing a [`GithubFetcher`].
pub struct GithubFetcherBuilder {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl GithubFetcherBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            timeout: Duration::from_secs(10),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the personal access token used as bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Point at a different GraphQL endpoint, e.g. GitHub Enterprise.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the HTTP request timeout.
    ///
    /// Default is 10 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header GitHub requires.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::Construction`] if no token is provided or the
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<GithubFetcher> {
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WatcherError::Construction("a GitHub token is required".to_string()))?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(|e| {
                WatcherError::Construction(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(GithubFetcher {
            endpoint: self.endpoint,
            client,
            token,
        })
    }
}

impl Default for GithubFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn request_body(namespace: &Namespace) -> serde_json::Value {
    json!({
        "query": TREE_QUERY,
        "variables": {
            "owner": namespace.owner,
            "name": namespace.repository,
            "expression": namespace.expression(),
        }
    })
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    object: Option<TreeObject>,
}

#[derive(Debug, Deserialize)]
struct TreeObject {
    #[serde(default)]
    entries: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    name: String,
    object: Option<BlobObject>,
}

#[derive(Debug, Deserialize)]
struct BlobObject {
    oid: Option<String>,
    text: Option<String>,
}

fn files_from_response(response: GraphqlResponse) -> Result<FileSet> {
    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(WatcherError::Fetch(messages.join("; ")));
    }

    let repository = response
        .data
        .and_then(|d| d.repository)
        .ok_or_else(|| WatcherError::Fetch("repository not found".to_string()))?;

    // A missing directory resolves to a null object: nothing configured yet.
    let Some(tree) = repository.object else {
        return Ok(FileSet::new());
    };

    let mut files = FileSet::new();
    for entry in tree.entries {
        let Some(BlobObject { oid: Some(oid), text }) = entry.object else {
            continue;
        };
        let file = File::from_entry(entry.name, oid, text.unwrap_or_default());
        files.insert(file.id.clone(), file);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BotType;

    fn parse(value: serde_json::Value) -> Result<FileSet> {
        files_from_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_builder() {
        let fetcher = GithubFetcher::builder()
            .with_token("token123")
            .with_endpoint("https://github.example.com/api/graphql")
            .with_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(fetcher.endpoint(), "https://github.example.com/api/graphql");
    }

    #[test]
    fn test_builder_no_token() {
        assert!(matches!(
            GithubFetcher::builder().build(),
            Err(WatcherError::Construction(_))
        ));
        assert!(GithubFetcher::builder().with_token("").build().is_err());
    }

    #[test]
    fn test_request_body_variables() {
        let ns = Namespace::new(
            "oklahomer",
            "go-sarah",
            "master",
            "bot/config",
            &BotType::from("botType"),
        );
        let body = request_body(&ns);
        assert_eq!(body["variables"]["owner"], "oklahomer");
        assert_eq!(body["variables"]["name"], "go-sarah");
        assert_eq!(body["variables"]["expression"], "master:bot/config/botType");
        assert!(body["query"].as_str().unwrap().contains("... on Blob"));
    }

    #[test]
    fn test_files_from_response() {
        let files = parse(json!({
            "data": {
                "repository": {
                    "object": {
                        "entries": [
                            {
                                "name": "hello.yml",
                                "object": { "oid": "oid", "text": "name: oklahomer\nrole: member\n" }
                            },
                            { "name": "nested", "object": {} }
                        ]
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(files.len(), 1);
        let file = &files["hello"];
        assert_eq!(file.extension, ".yml");
        assert_eq!(file.object_id, "oid");
        assert_eq!(file.content, "name: oklahomer\nrole: member\n");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let files = parse(json!({ "data": { "repository": { "object": null } } })).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_graphql_errors() {
        let result = parse(json!({
            "data": null,
            "errors": [{ "message": "Could not resolve to a Repository" }]
        }));
        match result {
            Err(WatcherError::Fetch(msg)) => assert!(msg.contains("Could not resolve")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_repository() {
        let result = parse(json!({ "data": { "repository": null } }));
        assert!(matches!(result, Err(WatcherError::Fetch(_))));
    }
}
