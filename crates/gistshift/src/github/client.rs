//! GitHub API client for gists and organization repositories.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::convert::{to_rate_limit_info, to_repository_target, to_snippet};
use super::error::error_for_status;
use super::types::{
    CreateGistRequest, CreateRepoRequest, FileContent, GistResponse, GitHubRateLimitResponse,
    RepoResponse, UpdateGistRequest,
};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::platform::{
    self, ApiRateLimiter, Completeness, NewRepository, NewSnippet, PlatformError, RateLimitInfo,
    RepositoryTarget, Snippet, SnippetClient, SnippetUpdate,
};
use crate::retry::{RetryConfig, with_rate_limit_retry};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "gistshift";
const ACCEPT: &str = "application/vnd.github+json";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// GitHub client implementing [`SnippetClient`].
///
/// Every call is a single request, optionally paced by an [`ApiRateLimiter`]
/// and retried on rate-limit responses when a retry budget is configured.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    token: Arc<str>,
    rate_limiter: Option<ApiRateLimiter>,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a client for the public API using a reqwest transport.
    pub fn new(token: &str) -> Result<Self, PlatformError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .map_err(|e| PlatformError::internal(e.to_string()))?;
        Ok(Self::with_transport(token, Arc::new(transport)))
    }

    pub fn with_transport(token: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_url: DEFAULT_API_URL.to_string(),
            token: Arc::from(token),
            rate_limiter: None,
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at another API root (GitHub Enterprise, test servers).
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: ApiRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Retry rate-limited calls up to `retries` times with backoff.
    #[must_use]
    pub fn with_rate_limit_retries(mut self, retries: usize) -> Self {
        self.retry = RetryConfig::with_max_retries(retries);
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The token used for API calls, also needed for authenticated git URLs.
    pub fn token(&self) -> &str {
        &self.token
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.api_url, path))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Send one request, mapping the status to a platform error.
    async fn send(&self, request: HttpRequest, resource: &str) -> platform::Result<HttpResponse> {
        self.wait_for_rate_limit().await;
        tracing::trace!(method = request.method.as_str(), url = %request.url, "GitHub request");
        let response = self.transport.send(request).await?;
        error_for_status(response, resource)
    }

    /// Send with the configured retry budget.
    async fn execute(&self, request: HttpRequest, resource: &str) -> platform::Result<HttpResponse> {
        with_rate_limit_retry(|| self.send(request.clone(), resource), &self.retry, resource).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> platform::Result<T> {
        let response = self.execute(self.request(HttpMethod::Get, path), resource).await?;
        decode(&response)
    }

    async fn send_json<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
        resource: &str,
    ) -> platform::Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(method, path)
            .json(body)
            .map_err(|e| PlatformError::internal(format!("failed to encode request: {e}")))?;
        let response = self.execute(request, resource).await?;
        decode(&response)
    }

    /// Current rate limits for every resource bucket.
    pub async fn get_rate_limits(&self) -> platform::Result<GitHubRateLimitResponse> {
        self.get_json("/rate_limit", "rate limits").await
    }

    /// The `core` bucket, which every gist and repository call draws from.
    pub async fn get_rate_limit(&self) -> platform::Result<RateLimitInfo> {
        let limits = self.get_rate_limits().await?;
        limits
            .core()
            .map(to_rate_limit_info)
            .ok_or_else(|| PlatformError::internal("rate limit response has no core bucket"))
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> platform::Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| PlatformError::internal(format!("JSON parse error: {e}")))
}

/// Percent-encode one path segment; names derived from filenames may hold `#`, `?` or spaces.
fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

fn file_contents(files: &IndexMap<String, String>) -> IndexMap<&str, FileContent<'_>> {
    files
        .iter()
        .map(|(name, content)| {
            (
                name.as_str(),
                FileContent {
                    content: content.as_str(),
                },
            )
        })
        .collect()
}

#[async_trait]
impl SnippetClient for GitHubClient {
    async fn list_snippets(&self, page: u32, per_page: u32) -> platform::Result<Vec<Snippet>> {
        let gists: Vec<GistResponse> = self
            .get_json(&format!("/gists?per_page={per_page}&page={page}"), "gists")
            .await?;
        Ok(gists
            .into_iter()
            .map(|g| to_snippet(g, Completeness::Summary))
            .collect())
    }

    async fn get_snippet(&self, id: &str) -> platform::Result<Snippet> {
        let gist: GistResponse = self
            .get_json(&format!("/gists/{}", segment(id)), &format!("gist {id}"))
            .await?;
        Ok(to_snippet(gist, Completeness::Full))
    }

    async fn create_snippet(&self, snippet: &NewSnippet) -> platform::Result<Snippet> {
        let body = CreateGistRequest {
            description: &snippet.description,
            public: snippet.public,
            files: file_contents(&snippet.files),
        };
        let gist: GistResponse = self
            .send_json(HttpMethod::Post, "/gists", &body, "gists")
            .await?;
        Ok(to_snippet(gist, Completeness::Full))
    }

    async fn update_snippet(&self, id: &str, update: &SnippetUpdate) -> platform::Result<Snippet> {
        let body = UpdateGistRequest {
            description: update.description.as_deref(),
            files: file_contents(&update.files),
        };
        let gist: GistResponse = self
            .send_json(
                HttpMethod::Patch,
                &format!("/gists/{}", segment(id)),
                &body,
                &format!("gist {id}"),
            )
            .await?;
        Ok(to_snippet(gist, Completeness::Full))
    }

    async fn delete_snippet(&self, id: &str) -> platform::Result<()> {
        let request = self.request(HttpMethod::Delete, &format!("/gists/{}", segment(id)));
        self.execute(request, &format!("gist {id}")).await?;
        Ok(())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> platform::Result<RepositoryTarget> {
        let repo: RepoResponse = self
            .get_json(
                &format!("/repos/{}/{}", segment(owner), segment(name)),
                &format!("repository {owner}/{name}"),
            )
            .await?;
        Ok(to_repository_target(repo))
    }

    async fn create_repository(
        &self,
        owner: &str,
        repository: &NewRepository,
    ) -> platform::Result<RepositoryTarget> {
        let body = CreateRepoRequest {
            name: &repository.name,
            description: &repository.description,
            homepage: repository.homepage.as_deref(),
            private: repository.private,
        };
        let repo: RepoResponse = self
            .send_json(
                HttpMethod::Post,
                &format!("/orgs/{}/repos", segment(owner)),
                &body,
                &format!("organization {owner}"),
            )
            .await?;
        Ok(to_repository_target(repo))
    }
}
