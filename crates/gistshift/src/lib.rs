//! Gistshift - move gists into organization repositories.
//!
//! This library discovers a user's public gists that match filename and
//! description patterns, then migrates each one into a repository (or a
//! private gist) owned by an organization, optionally concealing the original.
//!
//! # Features
//!
//! - `github` - Enables the GitHub REST client and the reqwest transport
//!   (on by default).
//!
//! # Example
//!
//! ```ignore
//! use gistshift::config::MirrorConfig;
//! use gistshift::github::GitHubClient;
//! use gistshift::mirror::run_pipeline;
//! use gistshift::transfer::GitCliTransfer;
//!
//! let config = MirrorConfig::builder()
//!     .organization("acme")
//!     .filename_filter(r"\.sh$")
//!     .build()?;
//! let client = GitHubClient::new(&token)?;
//! let transfer = GitCliTransfer::new().with_token(&token);
//!
//! let report = run_pipeline(&client, &transfer, &config, None).await?;
//! ```

pub mod config;
pub mod discovery;
pub mod http;
pub mod mirror;
pub mod naming;
pub mod platform;
pub mod progress;
pub mod retry;
pub mod throttle;
pub mod transfer;

#[cfg(feature = "github")]
pub mod github;

pub use config::{ConfigError, MirrorConfig, MirrorConfigBuilder, MirrorMode, TargetKind};
pub use discovery::{Discovered, discover};
pub use mirror::{MirrorError, MirrorOrchestrator, MirrorPair, MirrorReport, run_pipeline};
pub use platform::{PlatformError, Snippet, SnippetClient};
pub use progress::{MirrorProgress, ProgressCallback};
pub use throttle::ThrottleGate;
pub use transfer::{ContentTransfer, GitCliTransfer, TransferError};
