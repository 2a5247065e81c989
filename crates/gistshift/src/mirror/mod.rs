//! Migration of matched snippets into organization targets.
//!
//! # Module Structure
//!
//! - [`state`] - The per-snippet state machine
//! - [`types`] - Targets, pairs and the batch report
//! - `orchestrator` - [`MirrorOrchestrator`], which drives the transitions
//! - `errors` - [`MirrorError`]
//!
//! [`run_pipeline`] ties discovery and migration together:
//!
//! ```ignore
//! use gistshift::mirror::run_pipeline;
//!
//! let report = run_pipeline(&client, &transfer, &config, None).await?;
//! for pair in &report.pairs {
//!     println!("{pair}");
//! }
//! ```

mod errors;
mod orchestrator;
pub mod state;
pub mod types;

pub use errors::MirrorError;
pub use orchestrator::MirrorOrchestrator;
pub use state::{Migration, MigrationStage, MigrationState, TargetCheck};
pub use types::{
    MigrationFailure, MigrationOutcome, MigrationTarget, MirrorPair, MirrorReport,
    PLACEHOLDER_CONTENT, PlannedMigration,
};

use crate::config::MirrorConfig;
use crate::discovery::discover;
use crate::platform::{self, SnippetClient};
use crate::progress::ProgressCallback;
use crate::throttle::ThrottleGate;
use crate::transfer::ContentTransfer;

/// Discover matching snippets and migrate them, sharing one throttle gate.
///
/// Only a discovery failure is returned as an error; per-snippet failures are
/// collected in the report.
pub async fn run_pipeline<C, T>(
    client: &C,
    transfer: &T,
    config: &MirrorConfig,
    on_progress: Option<&ProgressCallback>,
) -> platform::Result<MirrorReport>
where
    C: SnippetClient + ?Sized,
    T: ContentTransfer + ?Sized,
{
    let throttle = ThrottleGate::new(config.throttle());

    let discovered = discover(client, config, &throttle, on_progress).await?;

    let report = MirrorOrchestrator::new(client, transfer, config, &throttle)
        .with_progress(on_progress)
        .run(discovered.matches)
        .await;

    Ok(report)
}
