use std::process::ExitCode;
use std::sync::Arc;

use gistshift::platform::short_error_message;
use gistshift::{GitCliTransfer, MirrorReport, run_pipeline};

use crate::commands::shared::github_client;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Handle the run command: discover, migrate and report.
///
/// Returns a failure exit code when any snippet failed; the rest of the
/// batch is still processed and reported.
pub(crate) async fn handle_run(
    config: &Config,
    dry_run: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mirror = config.mirror_config(dry_run)?;
    let settings = config.github_settings()?;
    let client = github_client(&settings)?;
    let transfer = GitCliTransfer::new().with_token(settings.token.clone());

    match client.get_rate_limit().await {
        Ok(limit) if limit.remaining == 0 => {
            tracing::warn!(reset_at = %limit.reset_at, "Rate limit exhausted before starting");
        }
        Ok(limit) => {
            tracing::debug!(remaining = limit.remaining, limit = limit.limit, "Rate limit");
        }
        Err(e) => {
            tracing::debug!("Could not read rate limit: {}", short_error_message(&e));
        }
    }

    tracing::info!(
        organization = mirror.organization(),
        mode = %mirror.mode(),
        target = %mirror.target_kind(),
        dry_run,
        "Starting"
    );

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let result = run_pipeline(&client, &transfer, &mirror, Some(&callback)).await;
    reporter.finish();
    let report = result?;

    print_report(&report, mirror.organization());

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Print one line per mirrored pair or planned migration, then a summary.
fn print_report(report: &MirrorReport, organization: &str) {
    for line in report_lines(report, organization) {
        println!("{}", line);
    }

    for failure in &report.failures {
        eprintln!("failed: {}", failure);
    }
}

fn report_lines(report: &MirrorReport, organization: &str) -> Vec<String> {
    let mut lines: Vec<String> = report.pairs.iter().map(ToString::to_string).collect();

    lines.extend(report.planned.iter().map(|plan| {
        let action = if plan.exists { "reuse" } else { "create" };
        format!(
            "{} -> {}/{} (would {})",
            plan.source, organization, plan.name, action
        )
    }));

    let summary = if report.planned.is_empty() {
        format!(
            "Mirrored {} of {} snippet(s), {} failed",
            report.pairs.len(),
            report.processed(),
            report.failures.len()
        )
    } else {
        format!(
            "Dry run: {} of {} snippet(s) planned, {} failed",
            report.planned.len(),
            report.processed(),
            report.failures.len()
        )
    };
    lines.push(summary);
    lines
}

#[cfg(test)]
mod tests {
    use gistshift::mirror::{
        MigrationFailure, MigrationStage, MirrorError, MirrorPair, PlannedMigration,
    };

    use super::*;

    #[test]
    fn report_lines_list_pairs_then_summary() {
        let report = MirrorReport {
            pairs: vec![MirrorPair {
                snippet_id: "abc".to_string(),
                source: "https://gist.github.com/abc".to_string(),
                target: "https://github.com/acme/tool".to_string(),
                target_name: "tool".to_string(),
            }],
            ..MirrorReport::default()
        };

        let lines = report_lines(&report, "acme");
        assert_eq!(
            lines,
            vec![
                "https://gist.github.com/abc -> https://github.com/acme/tool (tool)".to_string(),
                "Mirrored 1 of 1 snippet(s), 0 failed".to_string(),
            ]
        );
    }

    #[test]
    fn report_lines_describe_dry_run_plans() {
        let report = MirrorReport {
            planned: vec![PlannedMigration {
                snippet_id: "abc".to_string(),
                source: "https://gist.github.com/abc".to_string(),
                name: "tool".to_string(),
                exists: true,
            }],
            ..MirrorReport::default()
        };

        let lines = report_lines(&report, "acme");
        assert_eq!(lines[0], "https://gist.github.com/abc -> acme/tool (would reuse)");
        assert_eq!(lines[1], "Dry run: 1 of 1 snippet(s) planned, 0 failed");
    }

    #[test]
    fn summary_counts_failures_among_processed_snippets() {
        let report = MirrorReport {
            pairs: vec![MirrorPair {
                snippet_id: "abc".to_string(),
                source: "https://gist.github.com/abc".to_string(),
                target: "https://github.com/acme/tool".to_string(),
                target_name: "tool".to_string(),
            }],
            failures: vec![MigrationFailure {
                snippet_id: "def".to_string(),
                failed_at: MigrationStage::Resolved,
                error: MirrorError::precondition("no usable name"),
            }],
            ..MirrorReport::default()
        };

        let lines = report_lines(&report, "acme");
        assert_eq!(lines.last().unwrap(), "Mirrored 1 of 2 snippet(s), 1 failed");
    }
}
