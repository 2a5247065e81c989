//! GitHub implementation of [`SnippetClient`](crate::platform::SnippetClient).
//!
//! # Module Structure
//!
//! - [`types`] - REST payloads for gists, repositories and rate limits
//! - `client` - [`GitHubClient`], the request plumbing and trait impl
//! - `convert` - payload to platform type conversion
//! - `error` - HTTP status to [`PlatformError`](crate::platform::PlatformError) mapping
//!
//! ```ignore
//! use gistshift::github::GitHubClient;
//! use gistshift::platform::SnippetClient;
//!
//! let client = GitHubClient::new(&token)?.with_rate_limit_retries(3);
//! let first_page = client.list_snippets(1, 100).await?;
//! ```

mod client;
mod convert;
mod error;
pub mod types;

pub use client::{DEFAULT_API_URL, GitHubClient};
pub use convert::{to_rate_limit_info, to_repository_target, to_snippet};
pub use error::error_for_status;
pub use types::{GitHubRateLimitResponse, RateLimitResource};
