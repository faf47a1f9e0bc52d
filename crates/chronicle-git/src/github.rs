//! GitHub history provider
//!
//! Uses the REST compare endpoint for commit listings and the GraphQL API for
//! tag ordering (by tag commit date) and for the issues a pull request closes.
//!
//! # Rate limiting
//!
//! Rate-limit responses map to `ProviderError::RateLimited`. Nothing is
//! retried here; pacing of repeated lookups is the caller's job.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use chronicle_core::config::DEFAULT_API_URL;
use chronicle_core::error::ProviderError;
use chronicle_core::RepoSlug;

use crate::provider::{HistoryProvider, Result};
use crate::types::{CommitPage, CommitRange, CommitRecord, RelatedIssue, TagRef};

/// User-Agent header value for API requests
const USER_AGENT_VALUE: &str = "chronicle";

/// How many closing issues are requested per pull request
const CLOSING_ISSUES_LIMIT: usize = 50;

const LATEST_TAGS_QUERY: &str = r#"
query lastTags($owner: String!, $repo: String!, $limit: Int!) {
  repository(owner: $owner, name: $repo) {
    refs(first: $limit, refPrefix: "refs/tags/", orderBy: { field: TAG_COMMIT_DATE, direction: DESC }) {
      nodes {
        name
        target { oid }
      }
    }
  }
}
"#;

const CLOSING_ISSUES_QUERY: &str = r#"
query prIssues($owner: String!, $repo: String!, $prId: Int!, $limit: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $prId) {
      closingIssuesReferences(first: $limit) {
        nodes {
          number
          url
          author { login url }
        }
      }
    }
  }
}
"#;

/// GitHub provider
pub struct GitHubProvider {
    client: Client,
    token: String,
    slug: RepoSlug,
    api_base: String,
}

// Keep the token out of debug output
impl std::fmt::Debug for GitHubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubProvider")
            .field("slug", &self.slug)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubProvider {
    /// Create a provider against the public GitHub API
    pub fn new(token: impl Into<String>, slug: RepoSlug) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            slug,
            api_base: DEFAULT_API_URL.to_string(),
        }
    }

    /// Use a custom API base URL (GitHub Enterprise: `https://host/api/v3`)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Repository this provider reads from
    pub fn slug(&self) -> &RepoSlug {
        &self.slug
    }

    /// GraphQL endpoint matching the REST base
    fn graphql_url(&self) -> String {
        match self.api_base.strip_suffix("/v3") {
            Some(root) => format!("{}/graphql", root),
            None => format!("{}/graphql", self.api_base),
        }
    }

    /// Build URL for a repository endpoint
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.slug.owner, self.slug.name, path
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ProviderError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Handle API response, mapping errors appropriately
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
        } else {
            Err(Self::error_from_response(response, status).await)
        }
    }

    async fn error_from_response(response: Response, status: StatusCode) -> ProviderError {
        let rate_limited = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limited => {
                ProviderError::RateLimited
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
            StatusCode::UNAUTHORIZED => ProviderError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                ProviderError::AuthFailed(format!("Permission denied: {}", message))
            }
            StatusCode::NOT_FOUND => ProviderError::NotFound(message),
            _ if status.is_server_error() => ProviderError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ProviderError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        let response = self
            .client
            .post(self.graphql_url())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let result: GraphQLResponse<T> = Self::handle_response(response).await?;

        if let Some(error) = result.errors.and_then(|errors| errors.into_iter().next()) {
            return Err(ProviderError::ApiError {
                status: 200,
                message: error.message,
            });
        }

        result
            .data
            .ok_or_else(|| ProviderError::InvalidResponse("GraphQL response without data".into()))
    }
}

#[async_trait]
impl HistoryProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    #[instrument(skip(self), fields(repo = %self.slug))]
    async fn latest_tags(&self, limit: usize) -> Result<Vec<TagRef>> {
        let data: TagsData = self
            .graphql(
                LATEST_TAGS_QUERY,
                serde_json::json!({
                    "owner": self.slug.owner,
                    "repo": self.slug.name,
                    "limit": limit,
                }),
            )
            .await?;

        let repository = data
            .repository
            .ok_or_else(|| ProviderError::NotFound(format!("repository {}", self.slug)))?;

        let tags: Vec<TagRef> = repository
            .refs
            .nodes
            .into_iter()
            .map(|node| {
                let tag = TagRef::new(node.name);
                match node.target {
                    Some(target) => tag.with_commit(target.oid),
                    None => tag,
                }
            })
            .collect();

        debug!(count = tags.len(), "listed latest tags");
        Ok(tags)
    }

    #[instrument(skip(self, range), fields(repo = %self.slug, range = %range))]
    async fn list_commits(
        &self,
        range: &CommitRange,
        page: u32,
        per_page: usize,
    ) -> Result<CommitPage> {
        let url = self.repo_url(&format!("compare/{}", range.basehead()));

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let compare: GitHubCompare = Self::handle_response(response).await?;

        let commits: Vec<CommitRecord> = compare.commits.into_iter().map(Into::into).collect();
        debug!(
            page,
            page_size = commits.len(),
            total_commits = compare.total_commits,
            "fetched commit page"
        );

        Ok(CommitPage {
            total_commits: compare.total_commits,
            commits,
        })
    }

    #[instrument(skip(self), fields(repo = %self.slug))]
    async fn list_closing_issues(&self, pr: u64) -> Result<Vec<RelatedIssue>> {
        let data: PullRequestIssuesData = self
            .graphql(
                CLOSING_ISSUES_QUERY,
                serde_json::json!({
                    "owner": self.slug.owner,
                    "repo": self.slug.name,
                    "prId": pr,
                    "limit": CLOSING_ISSUES_LIMIT,
                }),
            )
            .await?;

        let pull_request = data
            .repository
            .and_then(|r| r.pull_request)
            .ok_or_else(|| ProviderError::NotFound(format!("pull request #{}", pr)))?;

        Ok(pull_request
            .closing_issues_references
            .nodes
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

/// GitHub API error response format
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GraphQL response wrapper
#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error format
#[derive(Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Deserialize)]
struct TagsData {
    repository: Option<TagsRepository>,
}

#[derive(Deserialize)]
struct TagsRepository {
    refs: Nodes<TagNode>,
}

#[derive(Deserialize)]
struct TagNode {
    name: String,
    target: Option<TagTarget>,
}

#[derive(Deserialize)]
struct TagTarget {
    oid: String,
}

#[derive(Deserialize)]
struct PullRequestIssuesData {
    repository: Option<PullRequestRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestRepository {
    pull_request: Option<PullRequestIssues>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestIssues {
    closing_issues_references: Nodes<IssueNode>,
}

#[derive(Deserialize)]
struct IssueNode {
    number: u64,
    url: String,
    author: Option<GraphQLActor>,
}

#[derive(Deserialize)]
struct GraphQLActor {
    login: String,
    url: String,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

impl From<IssueNode> for RelatedIssue {
    fn from(node: IssueNode) -> Self {
        let (author_login, author_url) = match node.author {
            Some(actor) => (Some(actor.login), Some(actor.url)),
            None => (None, None),
        };

        RelatedIssue {
            number: node.number,
            url: node.url,
            author_login,
            author_url,
        }
    }
}

/// REST compare response (subset)
#[derive(Deserialize)]
struct GitHubCompare {
    #[serde(default)]
    total_commits: usize,
    #[serde(default)]
    commits: Vec<GitHubCommit>,
}

#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    html_url: String,
    commit: GitHubCommitDetail,
    /// None when the commit email is not linked to an account
    author: Option<GitHubUser>,
}

#[derive(Deserialize)]
struct GitHubCommitDetail {
    message: String,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
    html_url: String,
}

impl From<GitHubCommit> for CommitRecord {
    fn from(gh: GitHubCommit) -> Self {
        let record = CommitRecord::new(gh.sha, gh.html_url, gh.commit.message);
        match gh.author {
            Some(user) => record.with_author(user.login, user.html_url),
            None => record,
        }
    }
}
