use std::sync::Arc;

use gistshift::naming;
use gistshift::{MirrorConfig, Snippet, ThrottleGate, discover};
use serde::Serialize;

use crate::commands::limits::{OutputFormat, print_rows};
use crate::commands::shared::github_client;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// A matched snippet and the target it would migrate to.
#[derive(Debug, Clone, Serialize, tabled::Tabled)]
pub(crate) struct MatchDisplay {
    #[tabled(rename = "Snippet")]
    pub id: String,
    #[tabled(rename = "File")]
    pub file: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Target")]
    pub target: String,
}

impl MatchDisplay {
    pub(crate) fn new(snippet: &Snippet, config: &MirrorConfig) -> Self {
        let target = match naming::derive(snippet, config) {
            Ok(derived) => format!("{}/{}", config.organization(), derived.name),
            Err(e) => format!("(skipped: {})", e),
        };

        Self {
            id: snippet.id.clone(),
            file: snippet.primary_filename().unwrap_or_default().to_string(),
            description: snippet.description.clone().unwrap_or_default(),
            target,
        }
    }
}

/// Handle the list command: discovery only, no writes.
pub(crate) async fn handle_list(
    config: &Config,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mirror = config.mirror_config(true)?;
    let settings = config.github_settings()?;
    let client = github_client(&settings)?;
    let throttle = ThrottleGate::new(mirror.throttle());

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let discovered = discover(&client, &mirror, &throttle, Some(&callback)).await;
    reporter.finish();
    let discovered = discovered?;

    let rows = discovered
        .matches
        .iter()
        .map(|snippet| MatchDisplay::new(snippet, &mirror))
        .collect();
    print_rows::<MatchDisplay>(rows, output)?;

    Ok(())
}
