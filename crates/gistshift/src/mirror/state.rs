//! Per-snippet migration state.
//!
//! A [`Migration`] carries the snippet and its current [`MigrationState`].
//! The orchestrator advances it one transition at a time:
//!
//! ```text
//! Matched -> Resolved -> TargetChecked -> Transferred -> SourceRetired -> Reported
//!                              \-> Planned (dry run)
//! ```

use std::fmt;

use crate::naming::DerivedNames;
use crate::platform::{RepositoryTarget, Snippet};

use super::types::{MigrationTarget, MirrorPair, PlannedMigration};

/// Outcome of the existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCheck {
    /// A repository with the derived name already exists and will be reused.
    Existing(RepositoryTarget),
    /// Nothing to reuse; the target must be created.
    Missing,
}

impl TargetCheck {
    pub fn exists(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationState {
    /// Discovered; the snippet may still be a summary.
    Matched,
    /// The snippet is a full record.
    Resolved,
    /// Names are derived and the target has been looked up.
    TargetChecked {
        derived: DerivedNames,
        check: TargetCheck,
    },
    /// Content has been pushed to the target.
    Transferred { target: MigrationTarget },
    /// The source has been left alone or concealed, per mode.
    SourceRetired { target: MigrationTarget },
    /// Terminal: the pair has been reported.
    Reported(MirrorPair),
    /// Terminal: dry run stopped after the existence check.
    Planned(PlannedMigration),
}

/// Name of a state, for failure reports and progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationStage {
    Matched,
    Resolved,
    TargetChecked,
    Transferred,
    SourceRetired,
    Reported,
    Planned,
}

impl fmt::Display for MigrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Matched => "matched",
            Self::Resolved => "resolved",
            Self::TargetChecked => "target-checked",
            Self::Transferred => "transferred",
            Self::SourceRetired => "source-retired",
            Self::Reported => "reported",
            Self::Planned => "planned",
        };
        f.write_str(name)
    }
}

impl MigrationState {
    pub fn stage(&self) -> MigrationStage {
        match self {
            Self::Matched => MigrationStage::Matched,
            Self::Resolved => MigrationStage::Resolved,
            Self::TargetChecked { .. } => MigrationStage::TargetChecked,
            Self::Transferred { .. } => MigrationStage::Transferred,
            Self::SourceRetired { .. } => MigrationStage::SourceRetired,
            Self::Reported(_) => MigrationStage::Reported,
            Self::Planned(_) => MigrationStage::Planned,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reported(_) | Self::Planned(_))
    }
}

/// A snippet moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub snippet: Snippet,
    pub state: MigrationState,
}

impl Migration {
    /// Start a migration for a discovered snippet.
    pub fn new(snippet: Snippet) -> Self {
        Self {
            snippet,
            state: MigrationState::Matched,
        }
    }

    pub fn stage(&self) -> MigrationStage {
        self.state.stage()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    #[must_use]
    pub(crate) fn with_state(self, state: MigrationState) -> Self {
        Self { state, ..self }
    }
}
