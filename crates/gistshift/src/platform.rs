//! Platform-agnostic records and the trait for snippet hosts.
//!
//! The migration pipeline only talks to a [`SnippetClient`]; the GitHub
//! implementation lives in [`crate::github`], and tests use in-memory fakes.
//!
//! # Example
//!
//! ```ignore
//! use gistshift::platform::{SnippetClient, PlatformError};
//!
//! async fn first_page<C: SnippetClient>(client: &C) -> Result<(), PlatformError> {
//!     for snippet in client.list_snippets(1, 100).await? {
//!         println!("{} {:?}", snippet.id, snippet.primary_filename());
//!     }
//!     Ok(())
//! }
//! ```

mod errors;
#[cfg(feature = "github")]
mod rate_limit;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
#[cfg(feature = "github")]
pub use rate_limit::ApiRateLimiter;
pub use types::{
    Completeness, NewRepository, NewSnippet, RateLimitInfo, RepositoryTarget, Snippet,
    SnippetClient, SnippetFile, SnippetUpdate, Visibility,
};

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use indexmap::IndexMap;

    use super::*;

    fn snippet(files: &[&str]) -> Snippet {
        Snippet {
            id: "abc123".to_string(),
            visibility: Visibility::Public,
            description: None,
            files: files
                .iter()
                .map(|name| (name.to_string(), SnippetFile::default()))
                .collect(),
            git_pull_url: "https://gist.github.com/abc123.git".to_string(),
            html_url: "https://gist.github.com/abc123".to_string(),
            completeness: Completeness::Summary,
        }
    }

    #[test]
    fn test_platform_error_api() {
        let err = PlatformError::api("Something went wrong");
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("Something went wrong"));
    }

    #[test]
    fn test_platform_error_not_found() {
        let err = PlatformError::not_found("org/repo");
        assert!(err.to_string().contains("Not found"));
        assert!(err.to_string().contains("org/repo"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_platform_error_is_rate_limited() {
        let rate_limited = PlatformError::RateLimited {
            reset_at: Utc::now(),
        };
        assert!(rate_limited.is_rate_limited());
        assert!(rate_limited.to_string().contains("Rate limit"));

        let api_error = PlatformError::api("some error");
        assert!(!api_error.is_rate_limited());

        let not_found = PlatformError::not_found("resource");
        assert!(!not_found.is_rate_limited());
    }

    #[test]
    fn test_platform_error_already_exists() {
        let err = PlatformError::already_exists("repository acme/tool");
        assert!(err.is_already_exists());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Already exists: repository acme/tool");
    }

    #[test]
    fn test_platform_error_network_and_internal() {
        assert!(
            PlatformError::network("connection refused")
                .to_string()
                .contains("Network error")
        );
        assert!(
            PlatformError::internal("unexpected state")
                .to_string()
                .contains("Internal error")
        );
        assert!(
            PlatformError::AuthRequired
                .to_string()
                .contains("Authentication required")
        );
    }

    #[test]
    fn test_primary_filename_follows_insertion_order() {
        let s = snippet(&["zeta.sh", "alpha.sh"]);
        assert_eq!(s.primary_filename(), Some("zeta.sh"));
        assert!(snippet(&[]).primary_filename().is_none());
    }

    #[test]
    fn test_snippet_flags() {
        let mut s = snippet(&["a.txt"]);
        assert!(s.is_public());
        assert!(s.is_summary());

        s.visibility = Visibility::Secret;
        s.completeness = Completeness::Full;
        assert!(!s.is_public());
        assert!(!s.is_summary());
    }

    #[test]
    fn test_repository_target_full_name() {
        let repo = RepositoryTarget {
            owner: "myorg".to_string(),
            name: "myrepo".to_string(),
            description: None,
            homepage: None,
            clone_url: "https://github.com/myorg/myrepo.git".to_string(),
            html_url: "https://github.com/myorg/myrepo".to_string(),
        };
        assert_eq!(repo.full_name(), "myorg/myrepo");
    }

    #[test]
    fn test_visibility_display() {
        assert_eq!(Visibility::Public.to_string(), "public");
        assert_eq!(Visibility::Secret.to_string(), "secret");
    }

    #[test]
    fn test_new_snippet_preserves_file_order() {
        let mut files = IndexMap::new();
        files.insert("b.txt".to_string(), "b".to_string());
        files.insert("a.txt".to_string(), "a".to_string());
        let new = NewSnippet {
            description: "d".to_string(),
            public: false,
            files,
        };
        let names: Vec<_> = new.files.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn test_short_error_message_multiline() {
        let err = std::io::Error::other("first line\nsecond line\nthird line");
        assert_eq!(short_error_message(&err), "first line");
    }

    #[cfg(feature = "github")]
    #[tokio::test]
    async fn test_api_rate_limiter_wait_allows_first_request() {
        use std::time::{Duration, Instant};

        let limiter = ApiRateLimiter::new(100);
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));

        // Zero is clamped to one request per second rather than panicking.
        let _zero = ApiRateLimiter::new(0).clone();
    }
}
