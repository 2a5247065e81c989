use std::fmt;

use serde::Serialize;

use crate::platform::{RepositoryTarget, Snippet};

use super::errors::MirrorError;
use super::state::MigrationStage;

/// Content written over every file of a snippet that has been moved away.
pub const PLACEHOLDER_CONTENT: &str = "This gist has moved.\n";

/// Where a snippet's content ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationTarget {
    /// A repository inside the organization.
    Repository(RepositoryTarget),
    /// A private snippet holding the content.
    Snippet(Snippet),
}

impl MigrationTarget {
    /// Git URL the content is pushed to.
    pub fn push_url(&self) -> &str {
        match self {
            Self::Repository(repo) => &repo.clone_url,
            Self::Snippet(snippet) => &snippet.git_pull_url,
        }
    }

    /// Browser URL of the target.
    pub fn html_url(&self) -> &str {
        match self {
            Self::Repository(repo) => &repo.html_url,
            Self::Snippet(snippet) => &snippet.html_url,
        }
    }

    /// Short human-readable name (`org/repo` or the snippet id).
    pub fn display_name(&self) -> String {
        match self {
            Self::Repository(repo) => repo.full_name(),
            Self::Snippet(snippet) => format!("snippet {}", snippet.id),
        }
    }

    /// Whether the push must overwrite existing history.
    ///
    /// New private snippets are created with a placeholder commit.
    pub fn needs_force_push(&self) -> bool {
        matches!(self, Self::Snippet(_))
    }
}

/// A completed migration: source snippet and resulting target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorPair {
    pub snippet_id: String,
    /// Browser URL of the source snippet.
    pub source: String,
    /// Browser URL of the target.
    pub target: String,
    pub target_name: String,
}

impl fmt::Display for MirrorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.target_name)
    }
}

/// What a dry run would have done with a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMigration {
    pub snippet_id: String,
    pub source: String,
    /// Derived target name.
    pub name: String,
    /// Whether the target already exists and would be reused.
    pub exists: bool,
}

/// A snippet whose migration was abandoned.
#[derive(Debug)]
pub struct MigrationFailure {
    pub snippet_id: String,
    /// The last state the snippet reached before the failing step.
    pub failed_at: MigrationStage,
    pub error: MirrorError,
}

impl fmt::Display for MigrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {}): {}", self.snippet_id, self.failed_at, self.error)
    }
}

/// Terminal result of one snippet's migration.
#[derive(Debug)]
pub enum MigrationOutcome {
    Reported(MirrorPair),
    Planned(PlannedMigration),
    Aborted(MigrationFailure),
}

/// Result of a whole batch, in input order within each list.
#[derive(Debug, Default)]
pub struct MirrorReport {
    pub pairs: Vec<MirrorPair>,
    pub failures: Vec<MigrationFailure>,
    /// Populated by dry runs only.
    pub planned: Vec<PlannedMigration>,
}

impl MirrorReport {
    pub fn record(&mut self, outcome: MigrationOutcome) {
        match outcome {
            MigrationOutcome::Reported(pair) => self.pairs.push(pair),
            MigrationOutcome::Planned(plan) => self.planned.push(plan),
            MigrationOutcome::Aborted(failure) => self.failures.push(failure),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Snippets that went through the pipeline, whatever the outcome.
    pub fn processed(&self) -> usize {
        self.pairs.len() + self.failures.len() + self.planned.len()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::platform::{Completeness, Visibility};

    fn repo() -> RepositoryTarget {
        RepositoryTarget {
            owner: "acme".to_string(),
            name: "tool".to_string(),
            description: None,
            homepage: None,
            clone_url: "https://github.com/acme/tool.git".to_string(),
            html_url: "https://github.com/acme/tool".to_string(),
        }
    }

    fn private_snippet() -> Snippet {
        Snippet {
            id: "p1".to_string(),
            visibility: Visibility::Secret,
            description: None,
            files: IndexMap::new(),
            git_pull_url: "https://gist.github.com/p1.git".to_string(),
            html_url: "https://gist.github.com/p1".to_string(),
            completeness: Completeness::Full,
        }
    }

    #[test]
    fn repository_target_pushes_to_clone_url_without_force() {
        let target = MigrationTarget::Repository(repo());
        assert_eq!(target.push_url(), "https://github.com/acme/tool.git");
        assert_eq!(target.display_name(), "acme/tool");
        assert!(!target.needs_force_push());
    }

    #[test]
    fn snippet_target_is_force_pushed() {
        let target = MigrationTarget::Snippet(private_snippet());
        assert_eq!(target.push_url(), "https://gist.github.com/p1.git");
        assert!(target.needs_force_push());
    }

    #[test]
    fn report_sorts_outcomes_into_lists() {
        let mut report = MirrorReport::default();
        report.record(MigrationOutcome::Reported(MirrorPair {
            snippet_id: "a".to_string(),
            source: "https://gist.github.com/a".to_string(),
            target: "https://github.com/acme/a".to_string(),
            target_name: "acme/a".to_string(),
        }));
        report.record(MigrationOutcome::Aborted(MigrationFailure {
            snippet_id: "b".to_string(),
            failed_at: MigrationStage::Resolved,
            error: MirrorError::precondition("no files"),
        }));

        assert_eq!(report.pairs.len(), 1);
        assert!(report.has_failures());
        assert_eq!(report.processed(), 2);
        assert_eq!(
            report.failures[0].to_string(),
            "b (after resolved): precondition failed: no files"
        );
    }

    #[test]
    fn pair_display_shows_both_ends() {
        let pair = MirrorPair {
            snippet_id: "a".to_string(),
            source: "https://gist.github.com/a".to_string(),
            target: "https://github.com/acme/a".to_string(),
            target_name: "acme/a".to_string(),
        };
        assert_eq!(
            pair.to_string(),
            "https://gist.github.com/a -> https://github.com/acme/a (acme/a)"
        );
    }
}
