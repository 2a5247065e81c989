use gistshift::progress::MirrorProgress;

/// Logging reporter using tracing for structured output.
///
/// The library already logs discovery totals, created targets, concealed
/// sources, finished pairs, failures and the batch summary, so only the
/// remaining events are logged here.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: MirrorProgress) {
        match event {
            MirrorProgress::FetchingPage { page } => {
                tracing::debug!(page, "Fetching page");
            }

            MirrorProgress::MigratingSnippets { count, dry_run } => {
                tracing::info!(count, dry_run, "Migrating snippets");
            }

            MirrorProgress::MigrationStarted { id, index } => {
                tracing::debug!(snippet = %id, index, "Migration started");
            }

            MirrorProgress::TargetChecked { id, target, exists } => {
                tracing::debug!(snippet = %id, target = %target, exists, "Target checked");
            }

            MirrorProgress::Transferred { id, target } => {
                tracing::debug!(snippet = %id, target = %target, "Pushed content");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
