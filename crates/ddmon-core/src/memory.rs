//! Deterministic in-memory repository for tests.
//!
//! Records every call, supports injected per-monitor failures and rejects
//! duplicate names on create the way the provider's create-only path is
//! expected to.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::error::{MonitorError, Result};
use crate::repository::{MonitorRepository, TagQuery};
use crate::types::{Monitor, MonitorId};

/// Repository operation kinds, used for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list`
    List,
    /// `get`
    Get,
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

/// A recorded repository call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `list` with the tag query and search text.
    List {
        /// Tag constraints.
        tags: Vec<String>,
        /// Search text.
        search: Option<String>,
    },
    /// `get` by ID.
    Get(MonitorId),
    /// `create` with the definition name.
    Create(String),
    /// `update` by ID.
    Update(MonitorId),
    /// `delete` by ID.
    Delete(MonitorId),
}

impl RecordedCall {
    /// Returns the operation kind.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::List { .. } => Operation::List,
            Self::Get(_) => Operation::Get,
            Self::Create(_) => Operation::Create,
            Self::Update(_) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    monitors: Vec<Monitor>,
    next_id: u64,
    calls: Vec<RecordedCall>,
    failures: HashSet<(Operation, u64)>,
    failing_names: HashSet<String>,
    fail_list: bool,
    prefix_tag_matching: bool,
}

/// In-memory [`MonitorRepository`].
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with monitors.
    ///
    /// Monitors without an ID are assigned one.
    #[must_use]
    pub fn with_monitors(monitors: impl IntoIterator<Item = Monitor>) -> Self {
        let repo = Self::new();
        {
            let mut state = repo.state.lock();
            for monitor in monitors {
                state.insert(monitor);
            }
        }
        repo
    }

    /// Makes `operation` on monitor `id` fail with a 500.
    #[must_use]
    pub fn failing(self, operation: Operation, id: u64) -> Self {
        self.state.lock().failures.insert((operation, id));
        self
    }

    /// Makes `create` fail for definitions with this name.
    #[must_use]
    pub fn failing_create(self, name: impl Into<String>) -> Self {
        self.state.lock().failing_names.insert(name.into());
        self
    }

    /// Makes every `list` call fail.
    #[must_use]
    pub fn failing_list(self) -> Self {
        self.state.lock().fail_list = true;
        self
    }

    /// Matches tag constraints by prefix instead of exactly, the way a
    /// lenient provider-side search might.
    #[must_use]
    pub fn with_prefix_tag_matching(self) -> Self {
        self.state.lock().prefix_tag_matching = true;
        self
    }

    /// Returns all recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Returns how many calls of the given kind were made.
    #[must_use]
    pub fn count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Returns true if any write (`create`, `update`, `delete`) happened.
    #[must_use]
    pub fn has_writes(&self) -> bool {
        self.state.lock().calls.iter().any(|c| {
            matches!(
                c.operation(),
                Operation::Create | Operation::Update | Operation::Delete
            )
        })
    }

    /// Returns a snapshot of the stored monitors.
    #[must_use]
    pub fn monitors(&self) -> Vec<Monitor> {
        self.state.lock().monitors.clone()
    }

    /// Returns a stored monitor by ID.
    #[must_use]
    pub fn monitor(&self, id: u64) -> Option<Monitor> {
        self.state
            .lock()
            .monitors
            .iter()
            .find(|m| m.id == Some(MonitorId(id)))
            .cloned()
    }
}

impl State {
    fn insert(&mut self, mut monitor: Monitor) -> Monitor {
        let id = match monitor.id {
            Some(id) => id,
            None => {
                self.next_id += 1;
                MonitorId(self.next_id)
            }
        };
        self.next_id = self.next_id.max(id.get());
        monitor.id = Some(id);
        self.monitors.push(monitor.clone());
        monitor
    }

    fn check(&self, operation: Operation, id: MonitorId, label: &'static str) -> Result<()> {
        if self.failures.contains(&(operation, id.get())) {
            return Err(MonitorError::Remote {
                operation: label,
                status: 500,
                body: format!("{{\"errors\":[\"injected failure for {id}\"]}}"),
            });
        }
        Ok(())
    }

    fn position(&self, id: MonitorId, label: &'static str) -> Result<usize> {
        self.monitors
            .iter()
            .position(|m| m.id == Some(id))
            .ok_or_else(|| MonitorError::Remote {
                operation: label,
                status: 404,
                body: "{\"errors\":[\"Monitor not found\"]}".to_string(),
            })
    }

    fn tag_matches(&self, monitor: &Monitor, constraint: &str) -> bool {
        let (negated, tag) = match constraint.strip_prefix("!=") {
            Some(rest) => (true, rest),
            None => match constraint.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, constraint),
            },
        };
        let present = if self.prefix_tag_matching {
            monitor.tags.iter().any(|t| t.starts_with(tag))
        } else {
            monitor.has_tag(tag)
        };
        present != negated
    }
}

fn search_matches(monitor: &Monitor, search: &str) -> bool {
    let needle = search.to_lowercase();
    monitor.name.to_lowercase().contains(&needle)
        || monitor
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(&needle))
}

impl MonitorRepository for InMemoryRepository {
    async fn list(&self, tags: &TagQuery, search: Option<&str>) -> Result<Vec<Monitor>> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::List {
            tags: tags.tags().to_vec(),
            search: search.map(str::to_string),
        });
        if state.fail_list {
            return Err(MonitorError::Remote {
                operation: "list monitors",
                status: 500,
                body: "{\"errors\":[\"injected list failure\"]}".to_string(),
            });
        }

        Ok(state
            .monitors
            .iter()
            .filter(|m| tags.tags().iter().all(|t| state.tag_matches(m, t)))
            .filter(|m| search.is_none_or(|s| search_matches(m, s)))
            .cloned()
            .collect())
    }

    async fn get(&self, id: MonitorId) -> Result<Monitor> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::Get(id));
        state.check(Operation::Get, id, "get monitor")?;
        let pos = state.position(id, "get monitor")?;
        Ok(state.monitors[pos].clone())
    }

    async fn create(&self, monitor: &Monitor) -> Result<Monitor> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::Create(monitor.name.clone()));
        if state.failing_names.contains(&monitor.name)
            || state.monitors.iter().any(|m| m.name == monitor.name)
        {
            return Err(MonitorError::Remote {
                operation: "create monitor",
                status: 400,
                body: format!("{{\"errors\":[\"Duplicate of an existing monitor: {}\"]}}", monitor.name),
            });
        }
        let mut definition = monitor.clone();
        definition.id = None;
        Ok(state.insert(definition))
    }

    async fn update(&self, id: MonitorId, monitor: &Monitor) -> Result<Monitor> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::Update(id));
        state.check(Operation::Update, id, "update monitor")?;
        let pos = state.position(id, "update monitor")?;
        let mut updated = monitor.clone();
        updated.id = Some(id);
        state.monitors[pos] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: MonitorId) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::Delete(id));
        state.check(Operation::Delete, id, "delete monitor")?;
        let pos = state.position(id, "delete monitor")?;
        state.monitors.remove(pos);
        Ok(())
    }
}
