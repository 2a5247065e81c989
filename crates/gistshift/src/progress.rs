//! Progress events emitted by discovery and migration.
//!
//! The library never prints; it emits [`MirrorProgress`] events through an
//! optional callback and the CLI decides how to render them.

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum MirrorProgress {
    /// Requesting a listing page.
    FetchingPage {
        /// Page number (1-indexed).
        page: u32,
    },

    /// A listing page arrived and was filtered.
    FetchedPage {
        page: u32,
        /// Snippets on this page.
        count: usize,
        /// Running total of matches.
        matched_so_far: usize,
    },

    /// Discovery finished.
    DiscoveryComplete {
        /// Snippets examined across all pages.
        scanned: usize,
        /// Snippets that passed both filters.
        matched: usize,
    },

    /// Starting the migration batch.
    MigratingSnippets {
        count: usize,
        dry_run: bool,
    },

    /// A snippet entered the pipeline.
    MigrationStarted {
        id: String,
        /// Position in the batch (0-indexed).
        index: usize,
    },

    /// The target's existence was checked.
    TargetChecked {
        id: String,
        target: String,
        exists: bool,
    },

    /// A new target was created.
    TargetCreated { id: String, target: String },

    /// Content was pushed to the target.
    Transferred { id: String, target: String },

    /// The source was overwritten and deleted.
    SourceConcealed { id: String },

    /// A snippet finished migrating.
    Mirrored {
        id: String,
        source: String,
        target: String,
    },

    /// Dry run: what would happen to a snippet.
    Planned {
        id: String,
        target: String,
        exists: bool,
    },

    /// A snippet's migration was abandoned.
    MigrationFailed {
        id: String,
        /// The last state the snippet reached.
        stage: String,
        error: String,
    },

    /// The batch finished.
    BatchComplete {
        mirrored: usize,
        failed: usize,
        planned: usize,
    },
}

/// Callback for progress updates.
pub type ProgressCallback = Box<dyn Fn(MirrorProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: MirrorProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn emit_without_callback_is_a_no_op() {
        emit(None, MirrorProgress::FetchingPage { page: 1 });
    }

    #[test]
    fn emit_forwards_events_to_callback() {
        let seen: Arc<Mutex<Vec<MirrorProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |event| {
            capture.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        });

        emit(
            Some(&callback),
            MirrorProgress::DiscoveryComplete {
                scanned: 3,
                matched: 1,
            },
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(
            seen[0],
            MirrorProgress::DiscoveryComplete {
                scanned: 3,
                matched: 1
            }
        ));
    }
}
