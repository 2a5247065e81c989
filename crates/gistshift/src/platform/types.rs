use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::errors::Result;

/// Rate limit information from the platform.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Maximum requests allowed per period.
    pub limit: usize,
    /// Remaining requests in current period.
    pub remaining: usize,
    /// When the rate limit resets.
    pub reset_at: DateTime<Utc>,
}

/// Snippet visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed and visible to everyone.
    Public,
    /// Unlisted ("secret") snippet.
    Secret,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Secret => f.write_str("secret"),
        }
    }
}

/// How much of a snippet the platform returned.
///
/// Listing endpoints return summaries without file contents; a single-item
/// fetch returns the full record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    Summary,
    Full,
}

/// Metadata for one file inside a snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetFile {
    /// URL of the raw file content.
    pub raw_url: Option<String>,
    /// File content, present only on full records.
    pub content: Option<String>,
}

/// A user-owned collection of named text files (a gist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Platform identifier, sufficient to fetch the full record.
    pub id: String,
    /// Public or secret.
    pub visibility: Visibility,
    /// Free-form description. Summaries may omit it.
    pub description: Option<String>,
    /// Files in the order the platform returned them.
    ///
    /// The first entry names the migrated repository, so this must keep
    /// insertion order.
    pub files: IndexMap<String, SnippetFile>,
    /// Git URL used to clone the snippet's content.
    pub git_pull_url: String,
    /// Browser URL of the snippet.
    pub html_url: String,
    /// Whether this is a summary or a full record.
    pub completeness: Completeness,
}

impl Snippet {
    /// Whether the snippet is publicly listed.
    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the snippet must be fetched again before use.
    #[inline]
    #[must_use]
    pub fn is_summary(&self) -> bool {
        self.completeness == Completeness::Summary
    }

    /// The first filename in iteration order.
    #[must_use]
    pub fn primary_filename(&self) -> Option<&str> {
        self.files.keys().next().map(String::as_str)
    }
}

/// A repository inside the target organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTarget {
    /// Owning organization.
    pub owner: String,
    /// Repository name, unique within the organization.
    pub name: String,
    /// Repository description.
    pub description: Option<String>,
    /// Homepage URL (a link back to the source snippet).
    pub homepage: Option<String>,
    /// HTTPS clone URL, used as the push destination.
    pub clone_url: String,
    /// Browser URL of the repository.
    pub html_url: String,
}

impl RepositoryTarget {
    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Parameters for creating a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub homepage: Option<String>,
    pub private: bool,
}

/// Parameters for creating a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnippet {
    pub description: String,
    pub public: bool,
    /// Filename to content, in order.
    pub files: IndexMap<String, String>,
}

/// Parameters for editing an existing snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetUpdate {
    /// New description, or `None` to leave it unchanged.
    pub description: Option<String>,
    /// Filename to replacement content.
    pub files: IndexMap<String, String>,
}

/// Trait for the remote snippet host.
///
/// Implementations perform exactly one remote call per method; pacing and
/// isolation of failures are the caller's job.
///
/// # Implementation Notes
///
/// Implementors should:
/// - Return [`Completeness::Summary`] records from `list_snippets` unless the
///   listing includes full file contents
/// - Map "no such resource" responses to `PlatformError::NotFound`
/// - Map rate limit responses to `PlatformError::RateLimited`
#[async_trait]
pub trait SnippetClient: Send + Sync {
    /// List one page of the authenticated user's snippets.
    ///
    /// Pages are 1-indexed. A page shorter than `per_page` is the last one.
    async fn list_snippets(&self, page: u32, per_page: u32) -> Result<Vec<Snippet>>;

    /// Fetch the full record for a snippet.
    async fn get_snippet(&self, id: &str) -> Result<Snippet>;

    /// Create a new snippet.
    async fn create_snippet(&self, snippet: &NewSnippet) -> Result<Snippet>;

    /// Replace the description and/or file contents of a snippet.
    async fn update_snippet(&self, id: &str, update: &SnippetUpdate) -> Result<Snippet>;

    /// Delete a snippet.
    async fn delete_snippet(&self, id: &str) -> Result<()>;

    /// Look up a repository. Returns `PlatformError::NotFound` if absent.
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryTarget>;

    /// Create a repository owned by an organization.
    async fn create_repository(
        &self,
        owner: &str,
        repository: &NewRepository,
    ) -> Result<RepositoryTarget>;
}
