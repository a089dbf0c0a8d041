//! # ddmon-cli
//!
//! Command-line interface for managing Datadog monitors.
//!
//! Provides commands for:
//! - Listing and describing monitors
//! - Single and filtered bulk deletion
//! - Applying JSON monitor templates per service and environment
//! - Adding and removing tags
//!
//! # Architecture
//!
//! Commands drive a [`ddmon_core::MonitorManager`] whose repository is the
//! [`client::DatadogClient`], which talks to the provider's v1 monitor API.
//!
//! ```text
//! ┌───────────┐   MonitorRepository   ┌────────────────┐   HTTPS   ┌─────────┐
//! │ ddmon-cli │──────────────────────►│ DatadogClient  │──────────►│ Datadog │
//! └───────────┘                       └────────────────┘           └─────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format};
pub use client::DatadogClient;
pub use error::CliError;
pub use output::OutputFormat;
