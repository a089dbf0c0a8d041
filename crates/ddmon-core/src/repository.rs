//! The monitor collection contract consumed by the engine.
//!
//! Transport lives elsewhere; the engine only depends on [`MonitorRepository`].
//! Every method is a single remote round-trip and any non-success response
//! surfaces as [`MonitorError::Remote`](crate::MonitorError::Remote) with the
//! status code and body verbatim.

use std::future::Future;

use crate::error::Result;
use crate::types::{Monitor, MonitorId};

/// Ordered, deduplicated `key:value` tag constraints ANDed by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    tags: Vec<String>,
}

impl TagQuery {
    /// Creates an empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Builds a query from tag constraints, dropping blanks and repeats.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut query = Self::new();
        for tag in tags {
            query.push(tag);
        }
        query
    }

    /// Appends a constraint unless it is blank or already present.
    pub fn push(&mut self, tag: impl Into<String>) {
        let tag = tag.into().trim().to_string();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Returns true if there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the constraints as given.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Renders the provider's `monitor_tags` parameter.
    ///
    /// A `!=value` constraint is forwarded as the provider's negation
    /// `!value`.
    #[must_use]
    pub fn to_param(&self) -> Option<String> {
        if self.tags.is_empty() {
            return None;
        }
        let rendered: Vec<String> = self
            .tags
            .iter()
            .map(|tag| match tag.strip_prefix("!=") {
                Some(negated) => format!("!{negated}"),
                None => tag.clone(),
            })
            .collect();
        Some(rendered.join(","))
    }
}

/// Read/write access to the provider's monitor collection.
pub trait MonitorRepository: Send + Sync {
    /// Lists monitors matching all tag constraints and the optional search
    /// text. The whole result comes back in one response.
    fn list(
        &self,
        tags: &TagQuery,
        search: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Monitor>>> + Send;

    /// Fetches one monitor.
    fn get(&self, id: MonitorId) -> impl Future<Output = Result<Monitor>> + Send;

    /// Creates a monitor from a definition.
    fn create(&self, monitor: &Monitor) -> impl Future<Output = Result<Monitor>> + Send;

    /// Replaces a monitor's definition.
    fn update(
        &self,
        id: MonitorId,
        monitor: &Monitor,
    ) -> impl Future<Output = Result<Monitor>> + Send;

    /// Deletes a monitor.
    fn delete(&self, id: MonitorId) -> impl Future<Output = Result<()>> + Send;
}
