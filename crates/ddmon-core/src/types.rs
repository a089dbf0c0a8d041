//! Core types for the monitor engine.
//!
//! This module provides the provider-side entity model:
//! - [`MonitorId`]: The provider-assigned numeric identifier
//! - [`Monitor`]: A monitor definition plus its computed state
//! - [`MonitorOptions`]: Known option sub-shapes plus an opaque fallback bag
//! - [`Timestamp`]: A lenient epoch timestamp

use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Overall state the provider reports for muted monitors.
pub const MUTED_STATE: &str = "muted";

/// Provider-assigned monitor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(pub u64);

impl MonitorId {
    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for MonitorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Epoch timestamp that accepts integers and numeric strings.
///
/// Anything else (non-numeric strings, floats, null) decodes as zero rather
/// than failing the whole monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Returns the raw epoch value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns true if the provider reported a positive value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0 > 0
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    const fn is_unset(&self) -> bool {
        !self.is_set()
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let raw = match value {
            Value::Number(n) => n.as_i64().unwrap_or(0),
            Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
            _ => 0,
        };
        Ok(Self(raw))
    }
}

/// Alert thresholds.
///
/// Keys other than the five typed ones (`unknown`, `period`, ...) are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Critical threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<f64>,
    /// Warning threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<f64>,
    /// OK threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<f64>,
    /// Critical recovery threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_recovery: Option<f64>,
    /// Warning recovery threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_recovery: Option<f64>,
    /// Thresholds the engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Thresholds {
    /// Returns true if no threshold is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.critical.is_none()
            && self.warning.is_none()
            && self.ok.is_none()
            && self.critical_recovery.is_none()
            && self.warning_recovery.is_none()
            && self.extra.is_empty()
    }
}

/// Monitor options: the sub-shapes the engine understands plus everything
/// else, kept verbatim so definitions round-trip unchanged.
///
/// A known key whose value does not fit its type (a negative interval, a
/// string flag) stays in `extra` instead of failing the monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorOptions {
    /// Alert thresholds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    /// Notify when data stops arriving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_no_data: Option<bool>,
    /// Notify tagged users on definition changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_audit: Option<bool>,
    /// Minutes without data before a no-data alert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_data_timeframe: Option<u64>,
    /// Minutes between re-notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renotify_interval: Option<u64>,
    /// Seconds to delay evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_delay: Option<u64>,
    /// Include triggering tags in notification titles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_tags: Option<bool>,
    /// Require a full evaluation window of data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_full_window: Option<bool>,
    /// Options the engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Moves `key` out of `map` if its value decodes as `T`.
fn take_typed<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let typed = serde_json::from_value(map.get(key)?.clone()).ok()?;
    map.remove(key);
    Some(typed)
}

impl<'de> Deserialize<'de> for MonitorOptions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut extra = match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(Self {
            thresholds: take_typed(&mut extra, "thresholds"),
            notify_no_data: take_typed(&mut extra, "notify_no_data"),
            notify_audit: take_typed(&mut extra, "notify_audit"),
            no_data_timeframe: take_typed(&mut extra, "no_data_timeframe"),
            renotify_interval: take_typed(&mut extra, "renotify_interval"),
            evaluation_delay: take_typed(&mut extra, "evaluation_delay"),
            include_tags: take_typed(&mut extra, "include_tags"),
            require_full_window: take_typed(&mut extra, "require_full_window"),
            extra,
        })
    }
}

impl MonitorOptions {
    /// Returns true if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.as_ref().is_none_or(Thresholds::is_empty)
            && self.notify_no_data.is_none()
            && self.notify_audit.is_none()
            && self.no_data_timeframe.is_none()
            && self.renotify_interval.is_none()
            && self.evaluation_delay.is_none()
            && self.include_tags.is_none()
            && self.require_full_window.is_none()
            && self.extra.is_empty()
    }
}

/// A provider-side monitor.
///
/// Tags are a set transported as a sequence; engine mutations never
/// introduce duplicates. `tags` is always serialized, so clearing the last
/// tag is sent to the provider as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Identifier, absent until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MonitorId>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Monitor type, e.g. `query alert`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub monitor_type: String,
    /// Query expression.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query: String,
    /// Notification message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Tags.
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tags: Vec<String>,
    /// Options.
    #[serde(default, skip_serializing_if = "MonitorOptions::is_empty")]
    pub options: MonitorOptions,
    /// Overall state as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_state: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Timestamp::is_unset")]
    pub created_at: Timestamp,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Timestamp::is_unset")]
    pub modified: Timestamp,
}

fn nullable_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Monitor {
    /// Creates a monitor definition with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<MonitorId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the overall state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.overall_state = Some(state.into());
        self
    }

    /// Returns true if `tag` is present verbatim.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns true if the provider reports the monitor as muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.overall_state.as_deref() == Some(MUTED_STATE)
    }

    /// Returns the overall state, or an empty string when unknown.
    #[must_use]
    pub fn state(&self) -> &str {
        self.overall_state.as_deref().unwrap_or_default()
    }
}
