//! Monitor resolution and bulk mutation engine for Datadog-style monitors.
//!
//! `ddmon-core` resolves sets of monitors from filter selectors, applies tag
//! and delete operations to them one at a time, and instantiates monitors
//! from parameterized JSON templates.
//!
//! # Features
//!
//! - **Selectors**: a single monitor ID, exact `key:value` tags, free-text
//!   search or a provider-native query, each optionally narrowed by state
//! - **Tag mutation**: set semantics, no duplicates, exact matching
//! - **Templates**: `{service}`, `{env}` and `{namespace}` substitution with
//!   create-or-update by monitor name
//! - **Batches**: one report entry per monitor, failures never abort the run
//!
//! Transport is pluggable through [`MonitorRepository`]; the `testing`
//! feature exposes an in-memory implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use ddmon_core::{FilterArgs, MonitorManager, TagMutation, TargetRequirement};
//!
//! let selector = FilterArgs {
//!     service: Some("checkout".into()),
//!     env: Some("hml".into()),
//!     ..FilterArgs::default()
//! }
//! .into_selector(TargetRequirement::Explicit)?;
//!
//! let manager = MonitorManager::new(client);
//! let outcome = manager
//!     .mutate_tags(&selector, TagMutation::Add(vec!["team:payments".into()]))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod config;
pub mod error;
pub mod filter;
pub mod manager;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod repository;
pub mod tags;
pub mod template;
pub mod types;
pub mod upsert;

// Re-export main types at crate root
pub use batch::{
    BatchEntry, BatchExecutor, BatchOperation, BatchReport, BatchStatus, ItemOutcome, run_batch,
};
pub use config::ApiConfig;
pub use error::{MonitorError, Result};
pub use filter::{
    CompositeFilter, FilterArgs, FilterResolver, FilterStrategy, MonitorFilter, MonitorSelector,
    StatePredicate, TargetRequirement, canonical_state, parse_tag_list,
};
pub use manager::{
    AppliedTemplate, MonitorManager, PlannedTemplate, TagMutationOutcome, TemplateFileResult,
    TemplatePlan, TemplateRunReport,
};
pub use repository::{MonitorRepository, TagQuery};
pub use tags::{TagMutation, TagMutator, add_tags, remove_tags};
pub use template::{Placeholders, TemplateDocument, TemplateEntry, customize, discover_templates};
pub use types::{Monitor, MonitorId, MonitorOptions, Thresholds, Timestamp};
pub use upsert::{UpsertMode, UpsertOutcome, Upserter};
