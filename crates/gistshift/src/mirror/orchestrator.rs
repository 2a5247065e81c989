use std::future::Future;
use std::path::Path;

use indexmap::IndexMap;

use crate::config::{MirrorConfig, MirrorMode, TargetKind};
use crate::naming::{self, DerivedNames};
use crate::platform::{NewRepository, NewSnippet, Snippet, SnippetClient, SnippetUpdate};
use crate::progress::{MirrorProgress, ProgressCallback, emit};
use crate::throttle::ThrottleGate;
use crate::transfer::{ContentTransfer, TransferError};

use super::errors::MirrorError;
use super::state::{Migration, MigrationState, TargetCheck};
use super::types::{
    MigrationFailure, MigrationOutcome, MigrationTarget, MirrorPair, MirrorReport,
    PLACEHOLDER_CONTENT, PlannedMigration,
};

/// Prefix of the per-snippet scratch directories.
const SCRATCH_PREFIX: &str = "gistshift-";

/// Drives matched snippets through the migration states, one at a time.
///
/// Failures are isolated to the snippet they happen on: the orchestrator
/// records them in the [`MirrorReport`] and continues with the next snippet.
pub struct MirrorOrchestrator<'a, C: ?Sized, T: ?Sized> {
    client: &'a C,
    transfer: &'a T,
    config: &'a MirrorConfig,
    throttle: &'a ThrottleGate,
    on_progress: Option<&'a ProgressCallback>,
}

impl<'a, C, T> MirrorOrchestrator<'a, C, T>
where
    C: SnippetClient + ?Sized,
    T: ContentTransfer + ?Sized,
{
    pub fn new(
        client: &'a C,
        transfer: &'a T,
        config: &'a MirrorConfig,
        throttle: &'a ThrottleGate,
    ) -> Self {
        Self {
            client,
            transfer,
            config,
            throttle,
            on_progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: Option<&'a ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    /// Migrate every snippet in order and collect the results.
    pub async fn run(&self, snippets: Vec<Snippet>) -> MirrorReport {
        emit(
            self.on_progress,
            MirrorProgress::MigratingSnippets {
                count: snippets.len(),
                dry_run: self.config.dry_run(),
            },
        );

        let mut report = MirrorReport::default();
        for (index, snippet) in snippets.into_iter().enumerate() {
            emit(
                self.on_progress,
                MirrorProgress::MigrationStarted {
                    id: snippet.id.clone(),
                    index,
                },
            );
            report.record(self.migrate(snippet).await);
        }

        tracing::info!(
            mirrored = report.pairs.len(),
            failed = report.failures.len(),
            planned = report.planned.len(),
            "Batch complete"
        );
        emit(
            self.on_progress,
            MirrorProgress::BatchComplete {
                mirrored: report.pairs.len(),
                failed: report.failures.len(),
                planned: report.planned.len(),
            },
        );

        report
    }

    /// Advance a single snippet until it reaches a terminal state or fails.
    pub async fn migrate(&self, snippet: Snippet) -> MigrationOutcome {
        let snippet_id = snippet.id.clone();
        let mut migration = Migration::new(snippet);

        loop {
            match migration.state {
                MigrationState::Reported(pair) => return MigrationOutcome::Reported(pair),
                MigrationState::Planned(plan) => return MigrationOutcome::Planned(plan),
                _ => {}
            }

            let failed_at = migration.stage();
            migration = match self.advance(migration).await {
                Ok(next) => next,
                Err(error) => {
                    tracing::warn!(
                        snippet = %snippet_id,
                        stage = %failed_at,
                        "Migration failed: {}",
                        error
                    );
                    emit(
                        self.on_progress,
                        MirrorProgress::MigrationFailed {
                            id: snippet_id.clone(),
                            stage: failed_at.to_string(),
                            error: error.to_string(),
                        },
                    );
                    return MigrationOutcome::Aborted(MigrationFailure {
                        snippet_id,
                        failed_at,
                        error,
                    });
                }
            };
        }
    }

    /// Perform exactly one state transition.
    ///
    /// Terminal migrations are returned unchanged.
    pub async fn advance(&self, migration: Migration) -> Result<Migration, MirrorError> {
        match migration.state.clone() {
            MigrationState::Matched => self.resolve(migration).await,
            MigrationState::Resolved => self.check_target(migration).await,
            MigrationState::TargetChecked { derived, check } => {
                if self.config.dry_run() {
                    return Ok(self.plan(migration, &derived, &check));
                }
                let target = self.create_and_transfer(&migration.snippet, &derived, check).await?;
                Ok(migration.with_state(MigrationState::Transferred { target }))
            }
            MigrationState::Transferred { target } => {
                self.retire_source(&migration.snippet).await?;
                Ok(migration.with_state(MigrationState::SourceRetired { target }))
            }
            MigrationState::SourceRetired { target } => Ok(self.report(migration, &target)),
            MigrationState::Reported(_) | MigrationState::Planned(_) => Ok(migration),
        }
    }

    /// Run a remote call, then wait on the throttle whatever the outcome.
    async fn paced<R>(&self, call: impl Future<Output = R>) -> R {
        let result = call.await;
        self.throttle.wait().await;
        result
    }

    async fn resolve(&self, migration: Migration) -> Result<Migration, MirrorError> {
        if !migration.snippet.is_summary() {
            return Ok(migration.with_state(MigrationState::Resolved));
        }

        tracing::debug!(snippet = %migration.snippet.id, "Fetching full record");
        let full = self
            .paced(self.client.get_snippet(&migration.snippet.id))
            .await?;

        Ok(Migration {
            snippet: full,
            state: MigrationState::Resolved,
        })
    }

    async fn check_target(&self, migration: Migration) -> Result<Migration, MirrorError> {
        let derived = naming::derive(&migration.snippet, self.config)?;
        let org = self.config.organization();

        let check = match self.config.target_kind() {
            TargetKind::Repository => {
                match self.paced(self.client.get_repository(org, &derived.name)).await {
                    Ok(existing) => TargetCheck::Existing(existing),
                    Err(e) if e.is_not_found() => TargetCheck::Missing,
                    Err(e) => return Err(e.into()),
                }
            }
            TargetKind::PrivateSnippet => TargetCheck::Missing,
        };

        tracing::debug!(
            snippet = %migration.snippet.id,
            name = %derived.name,
            exists = check.exists(),
            "Target checked"
        );
        emit(
            self.on_progress,
            MirrorProgress::TargetChecked {
                id: migration.snippet.id.clone(),
                target: derived.name.clone(),
                exists: check.exists(),
            },
        );

        Ok(migration.with_state(MigrationState::TargetChecked { derived, check }))
    }

    fn plan(&self, migration: Migration, derived: &DerivedNames, check: &TargetCheck) -> Migration {
        let plan = PlannedMigration {
            snippet_id: migration.snippet.id.clone(),
            source: migration.snippet.html_url.clone(),
            name: derived.name.clone(),
            exists: check.exists(),
        };

        tracing::info!(
            snippet = %plan.snippet_id,
            name = %plan.name,
            exists = plan.exists,
            "Dry run: would migrate"
        );
        emit(
            self.on_progress,
            MirrorProgress::Planned {
                id: plan.snippet_id.clone(),
                target: plan.name.clone(),
                exists: plan.exists,
            },
        );

        migration.with_state(MigrationState::Planned(plan))
    }

    async fn create_and_transfer(
        &self,
        snippet: &Snippet,
        derived: &DerivedNames,
        check: TargetCheck,
    ) -> Result<MigrationTarget, MirrorError> {
        let target = match check {
            TargetCheck::Existing(repo) => {
                tracing::debug!(target = %repo.full_name(), "Reusing existing repository");
                MigrationTarget::Repository(repo)
            }
            TargetCheck::Missing => {
                let created = self.create_target(snippet, derived).await?;
                emit(
                    self.on_progress,
                    MirrorProgress::TargetCreated {
                        id: snippet.id.clone(),
                        target: created.display_name(),
                    },
                );
                created
            }
        };

        self.transfer_content(snippet, &target).await?;
        emit(
            self.on_progress,
            MirrorProgress::Transferred {
                id: snippet.id.clone(),
                target: target.display_name(),
            },
        );

        Ok(target)
    }

    async fn create_target(
        &self,
        snippet: &Snippet,
        derived: &DerivedNames,
    ) -> Result<MigrationTarget, MirrorError> {
        let target = match self.config.target_kind() {
            TargetKind::Repository => {
                let request = NewRepository {
                    name: derived.name.clone(),
                    description: derived.description.clone(),
                    homepage: Some(snippet.html_url.clone()),
                    private: false,
                };
                let org = self.config.organization();
                let repo = match self.paced(self.client.create_repository(org, &request)).await {
                    Ok(repo) => repo,
                    // Created by someone else since the check; push into it like any existing one.
                    Err(e) if e.is_already_exists() => {
                        tracing::debug!(name = %request.name, "Repository appeared after check, reusing it");
                        self.paced(self.client.get_repository(org, &request.name))
                            .await?
                    }
                    Err(e) => return Err(e.into()),
                };
                MigrationTarget::Repository(repo)
            }
            TargetKind::PrivateSnippet => {
                let request = NewSnippet {
                    description: derived.description.clone(),
                    public: false,
                    files: placeholder_files(snippet),
                };
                let created = self.paced(self.client.create_snippet(&request)).await?;
                MigrationTarget::Snippet(created)
            }
        };

        tracing::info!(snippet = %snippet.id, target = %target.display_name(), "Created target");
        Ok(target)
    }

    /// Clone the source into a fresh scratch directory and push it to the target.
    ///
    /// The scratch directory is removed before returning, on every path.
    async fn transfer_content(
        &self,
        snippet: &Snippet,
        target: &MigrationTarget,
    ) -> Result<(), MirrorError> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(self.config.scratch_dir())
            .map_err(TransferError::from)?;
        let checkout = scratch.path().join(&snippet.id);

        let result = self.clone_and_push(snippet, &checkout, target).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!(path = %scratch_path.display(), "Failed to remove scratch directory: {}", e);
        }

        result
    }

    async fn clone_and_push(
        &self,
        snippet: &Snippet,
        checkout: &Path,
        target: &MigrationTarget,
    ) -> Result<(), MirrorError> {
        self.transfer
            .clone_source(&snippet.git_pull_url, checkout)
            .await?;
        self.transfer
            .push_from(
                checkout,
                target.push_url(),
                self.config.branch(),
                target.needs_force_push(),
            )
            .await?;
        Ok(())
    }

    async fn retire_source(&self, snippet: &Snippet) -> Result<(), MirrorError> {
        if self.config.mode() == MirrorMode::Mirror {
            return Ok(());
        }

        let update = SnippetUpdate {
            description: None,
            files: placeholder_files(snippet),
        };
        self.paced(self.client.update_snippet(&snippet.id, &update))
            .await?;
        self.paced(self.client.delete_snippet(&snippet.id)).await?;

        tracing::info!(snippet = %snippet.id, "Concealed source");
        emit(
            self.on_progress,
            MirrorProgress::SourceConcealed {
                id: snippet.id.clone(),
            },
        );
        Ok(())
    }

    fn report(&self, migration: Migration, target: &MigrationTarget) -> Migration {
        let pair = MirrorPair {
            snippet_id: migration.snippet.id.clone(),
            source: migration.snippet.html_url.clone(),
            target: target.html_url().to_string(),
            target_name: target.display_name(),
        };

        tracing::info!("Mirrored {}", pair);
        emit(
            self.on_progress,
            MirrorProgress::Mirrored {
                id: pair.snippet_id.clone(),
                source: pair.source.clone(),
                target: pair.target.clone(),
            },
        );

        migration.with_state(MigrationState::Reported(pair))
    }
}

/// The placeholder under every filename of `snippet`, in order.
fn placeholder_files(snippet: &Snippet) -> IndexMap<String, String> {
    snippet
        .files
        .keys()
        .map(|name| (name.clone(), PLACEHOLDER_CONTENT.to_string()))
        .collect()
}
