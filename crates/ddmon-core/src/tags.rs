//! Tag set mutation.
//!
//! Tags are compared by exact string equality. Mutations are read-modify-write
//! against the provider with no concurrency token: two concurrent mutations
//! of the same monitor can lose one tag delta.

use std::collections::HashSet;

use tracing::info;

use crate::error::Result;
use crate::repository::MonitorRepository;
use crate::types::{Monitor, MonitorId};

/// Union of `existing` and `to_add`, first occurrence order, no duplicates.
#[must_use]
pub fn add_tags(existing: &[String], to_add: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    existing
        .iter()
        .chain(to_add)
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

/// `existing` minus every tag in `to_remove`.
#[must_use]
pub fn remove_tags(existing: &[String], to_remove: &[String]) -> Vec<String> {
    let removed: HashSet<&str> = to_remove.iter().map(String::as_str).collect();
    existing
        .iter()
        .filter(|tag| !removed.contains(tag.as_str()))
        .cloned()
        .collect()
}

/// A tag set change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMutation {
    /// Add tags.
    Add(Vec<String>),
    /// Remove tags.
    Remove(Vec<String>),
}

impl TagMutation {
    /// Computes the new tag set.
    #[must_use]
    pub fn apply_to(&self, existing: &[String]) -> Vec<String> {
        match self {
            Self::Add(tags) => add_tags(existing, tags),
            Self::Remove(tags) => remove_tags(existing, tags),
        }
    }

    /// Returns the tags being added or removed.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        match self {
            Self::Add(tags) | Self::Remove(tags) => tags,
        }
    }

    /// Past-tense verb for messages.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Add(_) => "added to",
            Self::Remove(_) => "removed from",
        }
    }
}

/// Persists tag mutations.
#[derive(Debug)]
pub struct TagMutator<'a, R> {
    repo: &'a R,
}

impl<'a, R: MonitorRepository> TagMutator<'a, R> {
    /// Creates a mutator over the given repository.
    #[must_use]
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Reads the monitor, applies the mutation and writes the whole
    /// definition back. Returns the provider's view after the update.
    ///
    /// # Errors
    ///
    /// Returns the repository error from either the read or the write.
    pub async fn apply(&self, id: MonitorId, mutation: &TagMutation) -> Result<Monitor> {
        let mut monitor = self.repo.get(id).await?;
        monitor.tags = mutation.apply_to(&monitor.tags);
        let updated = self.repo.update(id, &monitor).await?;
        info!(
            monitor_id = %id,
            tags = ?mutation.tags(),
            "tags {} monitor",
            mutation.verb()
        );
        Ok(updated)
    }
}
