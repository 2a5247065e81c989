//! Immutable migration settings.
//!
//! [`MirrorConfig`] is built once through [`MirrorConfigBuilder`], which
//! compiles every pattern and checks every bound, and is then shared by
//! reference with every pipeline component.
//!
//! ```ignore
//! use gistshift::config::MirrorConfig;
//!
//! let config = MirrorConfig::builder()
//!     .organization("my-org")
//!     .filename_filter(r"\.sh$")
//!     .throttle_ms(1000)
//!     .build()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::throttle::DEFAULT_THROTTLE_MS;

/// Pattern that matches every input, including the empty string.
pub const MATCH_ALL: &str = ".*";

/// Pattern that matches the empty prefix; with an empty replacement it
/// leaves input unchanged.
pub const IDENTITY_PATTERN: &str = "^";

/// Default and maximum listing page size.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Branch the migrated content is pushed to.
pub const DEFAULT_BRANCH: &str = "main";

/// Errors raised while validating configuration. All are fatal before any
/// remote call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a target organization is required (--org or GISTSHIFT_ORGANIZATION)")]
    MissingOrganization,

    #[error("a GitHub token is required (--token or GISTSHIFT_GITHUB_TOKEN)")]
    MissingToken,

    #[error("throttle interval must be >= 0 ms, got {0}")]
    NegativeThrottle(i64),

    #[error("page size must be between 1 and {max}, got {0}", max = DEFAULT_PAGE_SIZE)]
    InvalidPageSize(u32),

    #[error("invalid {field} pattern: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// What happens to the source snippet after its content is transferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MirrorMode {
    /// Leave the source untouched.
    #[default]
    Mirror,
    /// Overwrite every source file with a placeholder, then delete the source.
    Conceal,
}

impl fmt::Display for MirrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mirror => f.write_str("mirror"),
            Self::Conceal => f.write_str("conceal"),
        }
    }
}

impl FromStr for MirrorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mirror" => Ok(Self::Mirror),
            "conceal" => Ok(Self::Conceal),
            other => Err(format!("unknown mode '{other}' (expected mirror or conceal)")),
        }
    }
}

/// Where migrated content lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// A repository in the target organization.
    #[default]
    Repository,
    /// A new secret snippet owned by the authenticated user.
    PrivateSnippet,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository => f.write_str("repository"),
            Self::PrivateSnippet => f.write_str("private-snippet"),
        }
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "repository" | "repo" => Ok(Self::Repository),
            "private-snippet" | "snippet" => Ok(Self::PrivateSnippet),
            other => Err(format!(
                "unknown target '{other}' (expected repository or private-snippet)"
            )),
        }
    }
}

/// A single-substitution rewrite: the first match of `pattern` is replaced
/// with `replacement` (which may reference capture groups as `$1`).
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: Regex, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace the first match only.
    pub fn apply(&self, input: &str) -> String {
        self.pattern
            .replace(input, self.replacement.as_str())
            .into_owned()
    }
}

/// Validated, read-only settings for one run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    organization: String,
    description_filter: Regex,
    filename_filter: Regex,
    name_rewrite: RewriteRule,
    description_rewrite: RewriteRule,
    throttle: Duration,
    mode: MirrorMode,
    target_kind: TargetKind,
    branch: String,
    page_size: u32,
    scratch_dir: PathBuf,
    dry_run: bool,
}

impl MirrorConfig {
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn description_filter(&self) -> &Regex {
        &self.description_filter
    }

    pub fn filename_filter(&self) -> &Regex {
        &self.filename_filter
    }

    pub fn name_rewrite(&self) -> &RewriteRule {
        &self.name_rewrite
    }

    pub fn description_rewrite(&self) -> &RewriteRule {
        &self.description_rewrite
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    pub fn mode(&self) -> MirrorMode {
        self.mode
    }

    pub fn target_kind(&self) -> TargetKind {
        self.target_kind
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Directory under which per-snippet scratch clones are created.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Collects raw settings and validates them into a [`MirrorConfig`].
#[derive(Debug, Clone)]
pub struct MirrorConfigBuilder {
    organization: Option<String>,
    description_filter: String,
    filename_filter: String,
    name_match: String,
    name_replace: String,
    description_match: String,
    description_replace: String,
    throttle_ms: i64,
    mode: MirrorMode,
    target_kind: TargetKind,
    branch: String,
    page_size: u32,
    scratch_dir: Option<PathBuf>,
    dry_run: bool,
}

impl Default for MirrorConfigBuilder {
    fn default() -> Self {
        Self {
            organization: None,
            description_filter: MATCH_ALL.to_string(),
            filename_filter: MATCH_ALL.to_string(),
            name_match: IDENTITY_PATTERN.to_string(),
            name_replace: String::new(),
            description_match: IDENTITY_PATTERN.to_string(),
            description_replace: String::new(),
            throttle_ms: DEFAULT_THROTTLE_MS as i64,
            mode: MirrorMode::default(),
            target_kind: TargetKind::default(),
            branch: DEFAULT_BRANCH.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            scratch_dir: None,
            dry_run: false,
        }
    }
}

impl MirrorConfigBuilder {
    #[must_use]
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    #[must_use]
    pub fn description_filter(mut self, pattern: impl Into<String>) -> Self {
        self.description_filter = pattern.into();
        self
    }

    #[must_use]
    pub fn filename_filter(mut self, pattern: impl Into<String>) -> Self {
        self.filename_filter = pattern.into();
        self
    }

    #[must_use]
    pub fn name_rewrite(mut self, pattern: impl Into<String>, replace: impl Into<String>) -> Self {
        self.name_match = pattern.into();
        self.name_replace = replace.into();
        self
    }

    #[must_use]
    pub fn description_rewrite(
        mut self,
        pattern: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        self.description_match = pattern.into();
        self.description_replace = replace.into();
        self
    }

    /// Signed so that a negative value from user input can be rejected
    /// instead of wrapping.
    #[must_use]
    pub fn throttle_ms(mut self, millis: i64) -> Self {
        self.throttle_ms = millis;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: MirrorMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn target_kind(mut self, kind: TargetKind) -> Self {
        self.target_kind = kind;
        self
    }

    #[must_use]
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    #[must_use]
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<MirrorConfig, ConfigError> {
        let organization = self
            .organization
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .ok_or(ConfigError::MissingOrganization)?;

        if self.throttle_ms < 0 {
            return Err(ConfigError::NegativeThrottle(self.throttle_ms));
        }

        if self.page_size == 0 || self.page_size > DEFAULT_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }

        let branch = self.branch.trim().to_string();
        if branch.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "branch",
                value: self.branch,
            });
        }

        Ok(MirrorConfig {
            organization,
            description_filter: compile("description filter", &self.description_filter)?,
            filename_filter: compile("filename filter", &self.filename_filter)?,
            name_rewrite: RewriteRule::new(
                compile("name rewrite", &self.name_match)?,
                self.name_replace,
            ),
            description_rewrite: RewriteRule::new(
                compile("description rewrite", &self.description_match)?,
                self.description_replace,
            ),
            throttle: Duration::from_millis(self.throttle_ms as u64),
            mode: self.mode,
            target_kind: self.target_kind,
            branch,
            page_size: self.page_size,
            scratch_dir: self.scratch_dir.unwrap_or_else(std::env::temp_dir),
            dry_run: self.dry_run,
        })
    }
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { field, source })
}
