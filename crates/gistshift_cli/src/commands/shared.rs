use gistshift::github::GitHubClient;
use gistshift::platform::{ApiRateLimiter, PlatformError};

use crate::config::GitHubSettings;

/// Build a GitHub client from resolved settings.
///
/// Proactive pacing is only installed when a positive requests-per-second
/// value is configured; the pipeline's throttle applies either way.
pub(crate) fn github_client(settings: &GitHubSettings) -> Result<GitHubClient, PlatformError> {
    let mut client =
        GitHubClient::new(&settings.token)?.with_rate_limit_retries(settings.rate_limit_retries);

    if let Some(ref api_url) = settings.api_url {
        client = client.with_api_url(api_url);
    }

    if settings.requests_per_second > 0 {
        client = client.with_rate_limiter(ApiRateLimiter::new(settings.requests_per_second));
    }

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GitHubSettings {
        GitHubSettings {
            token: "ghp_test".to_string(),
            api_url: None,
            requests_per_second: 0,
            rate_limit_retries: 0,
        }
    }

    #[test]
    fn client_uses_public_api_by_default() {
        let client = github_client(&settings()).unwrap();
        assert_eq!(client.api_url(), gistshift::github::DEFAULT_API_URL);
        assert_eq!(client.token(), "ghp_test");
    }

    #[test]
    fn client_honors_api_url_override() {
        let client = github_client(&GitHubSettings {
            api_url: Some("https://ghe.example.com/api/v3".to_string()),
            ..settings()
        })
        .unwrap();
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
    }
}
