//! GitHub REST wire types for gists, repositories and rate limits.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One file entry in a gist payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: Option<bool>,
}

/// A gist as returned by `GET /gists` and `GET /gists/{id}`.
///
/// `files` keeps the order the API returned them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistResponse {
    pub id: String,
    pub public: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: IndexMap<String, GistFile>,
    pub git_pull_url: String,
    pub html_url: String,
}

/// Body for `POST /gists`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateGistRequest<'a> {
    pub description: &'a str,
    pub public: bool,
    pub files: IndexMap<&'a str, FileContent<'a>>,
}

/// Body for `PATCH /gists/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateGistRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub files: IndexMap<&'a str, FileContent<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileContent<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// Repository fields the mirror needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoResponse {
    pub name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    pub clone_url: String,
    pub html_url: String,
}

/// Body for `POST /orgs/{org}/repos`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRepoRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<&'a str>,
    pub private: bool,
}

/// A single rate limit resource entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResource {
    pub limit: usize,
    pub used: usize,
    pub remaining: usize,
    /// Unix timestamp when the window resets.
    pub reset: u64,
}

impl RateLimitResource {
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset as i64, 0).unwrap_or_else(Utc::now)
    }
}

/// Response of `GET /rate_limit`, keyed by resource name (`core`, `search`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimitResponse {
    pub resources: BTreeMap<String, RateLimitResource>,
}

impl GitHubRateLimitResponse {
    /// The REST API bucket every gist and repository call draws from.
    pub fn core(&self) -> Option<&RateLimitResource> {
        self.resources.get("core")
    }
}

/// Error body GitHub returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    /// Validation details on 422 responses.
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// GitHub reports a name collision on create as a 422 validation error,
    /// tagged `already_exists` or described as "name already exists".
    pub fn is_name_taken(&self) -> bool {
        self.errors.iter().any(|detail| {
            detail.code.as_deref() == Some("already_exists")
                || detail
                    .message
                    .as_deref()
                    .is_some_and(|m| m.contains("already exists"))
        })
    }
}
