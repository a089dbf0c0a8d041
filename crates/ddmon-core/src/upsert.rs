//! Create-or-update keyed by exact monitor name.
//!
//! The name lookup and the following write are two separate round-trips. Two
//! runs racing on the same name can both miss and both create; the provider
//! offers no conditional create to close that window.

use tracing::{debug, info};

use crate::error::Result;
use crate::repository::{MonitorRepository, TagQuery};
use crate::types::{Monitor, MonitorId};

/// How an existing monitor with the same name is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpsertMode {
    /// Update the existing monitor, create otherwise.
    #[default]
    Upsert,
    /// Always create; the provider rejects duplicates.
    CreateOnly,
}

/// Result of [`Upserter::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// The monitor as returned by the provider.
    pub monitor: Monitor,
    /// True if a new monitor was created.
    pub created: bool,
}

/// Applies monitor definitions by name.
#[derive(Debug)]
pub struct Upserter<'a, R> {
    repo: &'a R,
    mode: UpsertMode,
}

impl<'a, R: MonitorRepository> Upserter<'a, R> {
    /// Creates an upserter.
    #[must_use]
    pub const fn new(repo: &'a R, mode: UpsertMode) -> Self {
        Self { repo, mode }
    }

    /// Finds a monitor whose name equals `name` exactly.
    ///
    /// The whole collection is listed; no match is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the repository error if listing fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Monitor>> {
        let monitors = self.repo.list(&TagQuery::new(), None).await?;
        Ok(monitors.into_iter().find(|m| m.name == name))
    }

    /// Returns the ID of the monitor this definition would update, if any.
    ///
    /// Never writes.
    ///
    /// # Errors
    ///
    /// Returns the repository error if listing fails.
    pub async fn check(&self, definition: &Monitor) -> Result<Option<MonitorId>> {
        Ok(self
            .find_by_name(&definition.name)
            .await?
            .and_then(|existing| existing.id))
    }

    /// Creates or updates the monitor.
    ///
    /// # Errors
    ///
    /// Returns the repository error from the lookup or the write. In
    /// [`UpsertMode::CreateOnly`] a duplicate name surfaces as the provider's
    /// create failure.
    pub async fn apply(&self, definition: &Monitor) -> Result<UpsertOutcome> {
        if self.mode == UpsertMode::Upsert {
            if let Some(id) = self.check(definition).await? {
                debug!(monitor_id = %id, name = %definition.name, "updating existing monitor");
                let monitor = self.repo.update(id, definition).await?;
                info!(monitor_id = %id, name = %monitor.name, "monitor updated");
                return Ok(UpsertOutcome {
                    monitor,
                    created: false,
                });
            }
        }

        let monitor = self.repo.create(definition).await?;
        info!(
            monitor_id = ?monitor.id.map(MonitorId::get),
            name = %monitor.name,
            "monitor created"
        );
        Ok(UpsertOutcome {
            monitor,
            created: true,
        })
    }
}
