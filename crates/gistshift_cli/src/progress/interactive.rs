use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use gistshift::progress::MirrorProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Spinner for listing pages.
    discovery_bar: Option<ProgressBar>,
    /// One tick per snippet that finished, failed or was planned.
    migrate_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn handle(&self, event: MirrorProgress) {
        let mut state = self.state();

        match event {
            MirrorProgress::FetchingPage { page } => {
                let bar = state.discovery_bar.get_or_insert_with(|| {
                    let bar = self.multi.add(ProgressBar::new_spinner());
                    bar.set_style(Self::spinner_style());
                    bar.set_prefix(format!("{:10}", "discover"));
                    bar.enable_steady_tick(Duration::from_millis(100));
                    bar
                });
                bar.set_message(format!("Fetching page {}...", page));
            }

            MirrorProgress::FetchedPage {
                page,
                count,
                matched_so_far,
            } => {
                if let Some(ref bar) = state.discovery_bar {
                    bar.set_message(format!(
                        "Page {} ({} snippets, {} matched)",
                        page, count, matched_so_far
                    ));
                }
            }

            MirrorProgress::DiscoveryComplete { scanned, matched } => {
                if let Some(ref bar) = state.discovery_bar {
                    bar.finish_with_message(format!("Matched {} of {} snippets", matched, scanned));
                }
            }

            MirrorProgress::MigratingSnippets { count, dry_run } => {
                let bar = self.multi.add(ProgressBar::new(count as u64));
                bar.set_style(Self::bar_style());
                bar.set_prefix(format!("{:10}", if dry_run { "plan" } else { "migrate" }));
                state.migrate_bar = Some(bar);
            }

            MirrorProgress::MigrationStarted { id, .. } => {
                if let Some(ref bar) = state.migrate_bar {
                    bar.set_message(id);
                }
            }

            MirrorProgress::TargetCreated { id, target } => {
                if let Some(ref bar) = state.migrate_bar {
                    bar.set_message(format!("{}: created {}", id, target));
                }
            }

            MirrorProgress::Transferred { id, target } => {
                if let Some(ref bar) = state.migrate_bar {
                    bar.set_message(format!("{}: pushed to {}", id, target));
                }
            }

            MirrorProgress::SourceConcealed { id } => {
                if let Some(ref bar) = state.migrate_bar {
                    bar.set_message(format!("{}: concealed source", id));
                }
            }

            MirrorProgress::Mirrored { .. } => {
                if let Some(ref bar) = state.migrate_bar {
                    bar.inc(1);
                }
            }

            // Plans and failures are listed in full by the final report.
            MirrorProgress::Planned { id, target, exists } => {
                if let Some(ref bar) = state.migrate_bar {
                    let action = if exists { "reuse" } else { "create" };
                    bar.set_message(format!("{}: would {} {}", id, action, target));
                    bar.inc(1);
                }
            }

            MirrorProgress::MigrationFailed { id, stage, .. } => {
                if let Some(ref bar) = state.migrate_bar {
                    bar.set_message(format!("{}: failed after {}", id, stage));
                    bar.inc(1);
                }
            }

            MirrorProgress::BatchComplete {
                mirrored,
                failed,
                planned,
            } => {
                if let Some(ref bar) = state.migrate_bar {
                    let summary = if planned > 0 {
                        format!("{} planned", planned)
                    } else {
                        format!("{} mirrored, {} failed", mirrored, failed)
                    };
                    bar.finish_with_message(summary);
                }
            }

            _ => {}
        }
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let state = self.state();
        for bar in [&state.discovery_bar, &state.migrate_bar].into_iter().flatten() {
            if !bar.is_finished() {
                bar.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_events_advance_the_migration_bar() {
        let reporter = InteractiveReporter::new();
        reporter.handle(MirrorProgress::MigratingSnippets {
            count: 2,
            dry_run: false,
        });
        reporter.handle(MirrorProgress::Mirrored {
            id: "a".to_string(),
            source: "https://gist.github.com/a".to_string(),
            target: "https://github.com/acme/a".to_string(),
        });
        reporter.handle(MirrorProgress::MigrationFailed {
            id: "b".to_string(),
            stage: "resolved".to_string(),
            error: "boom".to_string(),
        });

        let state = reporter.state();
        let bar = state.migrate_bar.as_ref().unwrap();
        assert_eq!(bar.position(), 2);
    }

    #[test]
    fn plans_and_failures_only_update_the_bar_message() {
        let reporter = InteractiveReporter::new();
        reporter.handle(MirrorProgress::MigratingSnippets {
            count: 2,
            dry_run: true,
        });
        reporter.handle(MirrorProgress::Planned {
            id: "a".to_string(),
            target: "tool".to_string(),
            exists: false,
        });
        {
            let state = reporter.state();
            let bar = state.migrate_bar.as_ref().unwrap();
            assert_eq!(bar.message(), "a: would create tool");
        }

        reporter.handle(MirrorProgress::MigrationFailed {
            id: "b".to_string(),
            stage: "resolved".to_string(),
            error: "500: server error".to_string(),
        });
        let state = reporter.state();
        let bar = state.migrate_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "b: failed after resolved");
        assert_eq!(bar.position(), 2);
    }

    #[test]
    fn events_before_a_bar_exists_are_ignored() {
        let reporter = InteractiveReporter::new();
        reporter.handle(MirrorProgress::DiscoveryComplete {
            scanned: 0,
            matched: 0,
        });
        reporter.finish();
        assert!(reporter.state().discovery_bar.is_none());
    }
}
