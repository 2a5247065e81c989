//! Configuration file support for gistshift.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GISTSHIFT_`, e.g., `GISTSHIFT_GITHUB_TOKEN`)
//! 3. Config file (./gistshift.toml, then ~/.config/gistshift/config.toml)
//! 4. Built-in defaults
//!
//! Keys are flat so that every key maps onto exactly one environment
//! variable: `throttle_ms` is `GISTSHIFT_THROTTLE_MS`.
//!
//! Example config file:
//! ```toml
//! github_token = "ghp_..."      # or use GISTSHIFT_GITHUB_TOKEN
//! organization = "acme-scripts"
//! filename_filter = '\.sh$'
//! name_match = '^'
//! name_replace = "gist-"
//! throttle_ms = 4000
//! mode = "conceal"              # mirror | conceal
//! target = "repository"         # repository | private-snippet
//! rate_limit_retries = 3
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use gistshift::config::{DEFAULT_BRANCH, DEFAULT_PAGE_SIZE, IDENTITY_PATTERN, MATCH_ALL};
use gistshift::throttle::DEFAULT_THROTTLE_MS;
use gistshift::{ConfigError, MirrorConfig, MirrorMode, TargetKind};
use serde::Deserialize;

use crate::{ConnectionArgs, MirrorArgs};

/// Flat, fully optional configuration as read from files and the environment.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API token, used for the API and for git over HTTPS.
    pub github_token: Option<String>,
    /// API base URL (GitHub Enterprise or a test server).
    pub api_url: Option<String>,
    /// Proactive request pacing inside the client; 0 disables it.
    pub requests_per_second: Option<u32>,
    /// How many times a rate-limited call is retried with backoff.
    pub rate_limit_retries: Option<usize>,

    pub organization: Option<String>,
    pub description_filter: Option<String>,
    pub filename_filter: Option<String>,
    pub name_match: Option<String>,
    pub name_replace: Option<String>,
    pub description_match: Option<String>,
    pub description_replace: Option<String>,
    /// Pause after each remote call, in milliseconds.
    pub throttle_ms: Option<i64>,
    pub mode: Option<MirrorMode>,
    pub target: Option<TargetKind>,
    pub branch: Option<String>,
    pub page_size: Option<u32>,
    pub scratch_dir: Option<PathBuf>,
}

/// GitHub connection settings resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub token: String,
    pub api_url: Option<String>,
    pub requests_per_second: u32,
    pub rate_limit_retries: usize,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. XDG config file (~/.config/gistshift/config.toml)
    /// 2. Local config file (./gistshift.toml)
    /// 3. Environment variables with GISTSHIFT_ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let local_config = PathBuf::from("gistshift.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gistshift.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // No key separator: GISTSHIFT_THROTTLE_MS -> throttle_ms
        builder = builder.add_source(Environment::with_prefix("GISTSHIFT").try_parsing(true));

        builder.build()?.try_deserialize()
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gistshift").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply connection flags on top of the loaded layers.
    #[must_use]
    pub fn with_connection(mut self, args: &ConnectionArgs) -> Self {
        set(&mut self.github_token, &args.token);
        set(&mut self.api_url, &args.api_url);
        set(&mut self.requests_per_second, &args.requests_per_second);
        set(&mut self.rate_limit_retries, &args.rate_limit_retries);
        self
    }

    /// Apply every pipeline flag on top of the loaded layers.
    #[must_use]
    pub fn with_overrides(self, args: &MirrorArgs) -> Self {
        let mut this = self.with_connection(&args.connection);
        this.apply_pipeline_flags(args);
        this
    }

    fn apply_pipeline_flags(&mut self, args: &MirrorArgs) {
        set(&mut self.organization, &args.org);
        set(&mut self.description_filter, &args.description_filter);
        set(&mut self.filename_filter, &args.filename_filter);
        set(&mut self.name_match, &args.name_match);
        set(&mut self.name_replace, &args.name_replace);
        set(&mut self.description_match, &args.description_match);
        set(&mut self.description_replace, &args.description_replace);
        set(&mut self.throttle_ms, &args.throttle_ms);
        set(&mut self.mode, &args.mode);
        set(&mut self.target, &args.target);
        set(&mut self.branch, &args.branch);
        set(&mut self.page_size, &args.page_size);
        set(&mut self.scratch_dir, &args.scratch_dir);
    }

    /// Validate the pipeline settings, filling in defaults.
    pub fn mirror_config(&self, dry_run: bool) -> Result<MirrorConfig, ConfigError> {
        let text = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };

        let mut builder = MirrorConfig::builder()
            .description_filter(text(&self.description_filter, MATCH_ALL))
            .filename_filter(text(&self.filename_filter, MATCH_ALL))
            .name_rewrite(
                text(&self.name_match, IDENTITY_PATTERN),
                text(&self.name_replace, ""),
            )
            .description_rewrite(
                text(&self.description_match, IDENTITY_PATTERN),
                text(&self.description_replace, ""),
            )
            .throttle_ms(self.throttle_ms.unwrap_or(DEFAULT_THROTTLE_MS as i64))
            .mode(self.mode.unwrap_or_default())
            .target_kind(self.target.unwrap_or_default())
            .branch(text(&self.branch, DEFAULT_BRANCH))
            .page_size(self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
            .dry_run(dry_run);

        if let Some(ref org) = self.organization {
            builder = builder.organization(org.clone());
        }
        if let Some(ref dir) = self.scratch_dir {
            builder = builder.scratch_dir(dir.clone());
        }

        builder.build()
    }

    /// Resolve the GitHub settings; a token is mandatory.
    pub fn github_settings(&self) -> Result<GitHubSettings, ConfigError> {
        let token = self
            .github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(GitHubSettings {
            token: token.to_string(),
            api_url: self.api_url.clone(),
            requests_per_second: self.requests_per_second.unwrap_or(0),
            rate_limit_retries: self.rate_limit_retries.unwrap_or(0),
        })
    }
}

fn set<T: Clone>(slot: &mut Option<T>, flag: &Option<T>) {
    if let Some(value) = flag {
        *slot = Some(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn from_toml(toml_content: &str) -> Config {
        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();
        settings.try_deserialize().unwrap()
    }

    fn args() -> MirrorArgs {
        MirrorArgs::default()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github_token.is_none());
        assert!(config.organization.is_none());
        assert!(config.throttle_ms.is_none());
    }

    #[test]
    fn test_config_builder_with_toml_string() {
        let config = from_toml(
            r#"
            github_token = "ghp_test123"
            organization = "acme"
            filename_filter = '\.sh$'
            throttle_ms = 250
            mode = "conceal"
            target = "private-snippet"
            rate_limit_retries = 3
            "#,
        );

        assert_eq!(config.github_token.as_deref(), Some("ghp_test123"));
        assert_eq!(config.organization.as_deref(), Some("acme"));
        assert_eq!(config.throttle_ms, Some(250));
        assert_eq!(config.mode, Some(MirrorMode::Conceal));
        assert_eq!(config.target, Some(TargetKind::PrivateSnippet));
        assert_eq!(config.rate_limit_retries, Some(3));
    }

    #[test]
    fn test_defaults_are_applied_when_resolving() {
        let config = from_toml(r#"organization = "acme""#);
        let mirror = config.mirror_config(false).unwrap();

        assert_eq!(mirror.organization(), "acme");
        assert_eq!(mirror.throttle(), Duration::from_millis(4000));
        assert_eq!(mirror.mode(), MirrorMode::Mirror);
        assert_eq!(mirror.target_kind(), TargetKind::Repository);
        assert_eq!(mirror.branch(), "main");
        assert_eq!(mirror.page_size(), 100);
        assert!(!mirror.dry_run());
    }

    #[test]
    fn test_flags_override_file_values() {
        let config = from_toml(
            r#"
            organization = "from-file"
            throttle_ms = 250
            "#,
        );
        let overrides = MirrorArgs {
            org: Some("from-flag".to_string()),
            throttle_ms: Some(0),
            ..args()
        };

        let mirror = config.with_overrides(&overrides).mirror_config(true).unwrap();
        assert_eq!(mirror.organization(), "from-flag");
        assert_eq!(mirror.throttle(), Duration::ZERO);
        assert!(mirror.dry_run());
    }

    #[test]
    fn test_missing_organization_is_rejected() {
        let err = Config::default().mirror_config(false).unwrap_err();
        assert!(matches!(err, ConfigError::MissingOrganization));
    }

    #[test]
    fn test_negative_throttle_is_rejected() {
        let config = from_toml(
            r#"
            organization = "acme"
            throttle_ms = -1
            "#,
        );
        let err = config.mirror_config(false).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeThrottle(-1)));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = from_toml(
            r#"
            organization = "acme"
            filename_filter = "(unclosed"
            "#,
        );
        let err = config.mirror_config(false).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = Config::default().github_settings().unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));

        let blank = from_toml(r#"github_token = "  ""#);
        assert!(matches!(
            blank.github_settings().unwrap_err(),
            ConfigError::MissingToken
        ));
    }

    #[test]
    fn test_github_settings_defaults() {
        let config = Config::default().with_connection(&ConnectionArgs {
            token: Some("ghp_flag".to_string()),
            ..ConnectionArgs::default()
        });
        let github = config.github_settings().unwrap();

        assert_eq!(github.token, "ghp_flag");
        assert_eq!(github.requests_per_second, 0);
        assert_eq!(github.rate_limit_retries, 0);
        assert!(github.api_url.is_none());
    }
}
