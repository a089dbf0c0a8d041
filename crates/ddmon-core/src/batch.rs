//! Sequential per-monitor operations with non-aborting failure handling.
//!
//! [`run_batch`] is the only place a batch status is computed. It visits the
//! monitors in the given order, one at a time, and always yields exactly one
//! [`BatchEntry`] per input monitor.

use std::fmt;
use std::future::Future;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{MonitorError, Result};
use crate::repository::MonitorRepository;
use crate::tags::{TagMutation, TagMutator};
use crate::types::{Monitor, MonitorId};

/// Per-item status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// The monitor was deleted.
    Deleted,
    /// The monitor was updated.
    Updated,
    /// The operation failed; holds the error description.
    Failed(String),
}

impl BatchStatus {
    /// Returns true for [`BatchStatus::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => f.write_str("deleted"),
            Self::Updated => f.write_str("updated"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

impl Serialize for BatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of one successful item operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The monitor is gone.
    Deleted,
    /// The monitor now carries these tags.
    Updated {
        /// Resulting tag set.
        tags: Vec<String>,
    },
}

/// One line of a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    /// Monitor ID.
    pub id: MonitorId,
    /// Monitor name.
    pub name: String,
    /// What happened.
    pub status: BatchStatus,
    /// Resulting tags, only for successful tag mutations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// All entries of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchReport {
    /// Entries in input order.
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| !e.status.is_failed())
    }

    /// Entries that failed.
    pub fn failed(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| e.status.is_failed())
    }
}

/// Runs `operation` once per monitor, in order, recording every outcome.
///
/// A failing item never stops the batch and nothing is retried.
pub async fn run_batch<F, Fut>(monitors: Vec<Monitor>, mut operation: F) -> BatchReport
where
    F: FnMut(Monitor) -> Fut,
    Fut: Future<Output = Result<ItemOutcome>>,
{
    let mut entries = Vec::with_capacity(monitors.len());

    for monitor in monitors {
        let id = monitor.id.unwrap_or(MonitorId(0));
        let name = monitor.name.clone();
        debug!(monitor_id = %id, name = %name, "batch item");

        let (status, tags) = match operation(monitor).await {
            Ok(ItemOutcome::Deleted) => (BatchStatus::Deleted, None),
            Ok(ItemOutcome::Updated { tags }) => (BatchStatus::Updated, Some(tags)),
            Err(err) => {
                warn!(monitor_id = %id, error = %err, "batch item failed");
                (BatchStatus::Failed(err.to_string()), None)
            }
        };

        entries.push(BatchEntry {
            id,
            name,
            status,
            tags,
        });
    }

    BatchReport { entries }
}

/// Operations available to [`BatchExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Delete every monitor.
    Delete,
    /// Add tags to every monitor.
    AddTags(Vec<String>),
    /// Remove tags from every monitor.
    RemoveTags(Vec<String>),
}

impl BatchOperation {
    /// Returns the tag mutation, if this is one.
    #[must_use]
    pub fn mutation(&self) -> Option<TagMutation> {
        match self {
            Self::Delete => None,
            Self::AddTags(tags) => Some(TagMutation::Add(tags.clone())),
            Self::RemoveTags(tags) => Some(TagMutation::Remove(tags.clone())),
        }
    }
}

impl From<TagMutation> for BatchOperation {
    fn from(mutation: TagMutation) -> Self {
        match mutation {
            TagMutation::Add(tags) => Self::AddTags(tags),
            TagMutation::Remove(tags) => Self::RemoveTags(tags),
        }
    }
}

fn require_id(monitor: &Monitor) -> Result<MonitorId> {
    monitor
        .id
        .ok_or_else(|| MonitorError::validation(format!("monitor {:?} has no id", monitor.name)))
}

/// Runs [`BatchOperation`]s against a repository.
#[derive(Debug)]
pub struct BatchExecutor<'a, R> {
    repo: &'a R,
}

impl<'a, R: MonitorRepository> BatchExecutor<'a, R> {
    /// Creates an executor.
    #[must_use]
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Applies `operation` to each monitor.
    pub async fn run(&self, monitors: Vec<Monitor>, operation: &BatchOperation) -> BatchReport {
        let repo = self.repo;
        match operation.mutation() {
            None => {
                run_batch(monitors, move |monitor| async move {
                    let id = require_id(&monitor)?;
                    repo.delete(id).await?;
                    Ok(ItemOutcome::Deleted)
                })
                .await
            }
            Some(mutation) => {
                let mutator = TagMutator::new(repo);
                let (mutator, mutation) = (&mutator, &mutation);
                run_batch(monitors, move |monitor| async move {
                    let id = require_id(&monitor)?;
                    let updated = mutator.apply(id, mutation).await?;
                    Ok(ItemOutcome::Updated { tags: updated.tags })
                })
                .await
            }
        }
    }
}
