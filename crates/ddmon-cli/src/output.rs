//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::collections::BTreeSet;
use std::io::Write;

use chrono::DateTime;
use ddmon_core::{
    AppliedTemplate, BatchEntry, BatchReport, Monitor, MonitorId, TemplatePlan, TemplateRunReport,
    Timestamp,
};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

const RULE_WIDTH: usize = 80;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

fn rule<W: Write>(writer: &mut W, ch: char) -> Result<(), CliError> {
    writeln!(writer, "{}", ch.to_string().repeat(RULE_WIDTH))?;
    Ok(())
}

fn display_status(monitor: &Monitor) -> &'static str {
    if monitor.is_muted() {
        "Disabled"
    } else {
        "Enabled"
    }
}

fn display_id(id: Option<MonitorId>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn display_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "(none)".to_string()
    } else {
        tags.join(", ")
    }
}

fn display_timestamp(ts: Timestamp) -> String {
    match DateTime::from_timestamp(ts.get(), 0) {
        Some(at) => format!("{} ({})", ts.get(), at.to_rfc3339()),
        None => ts.get().to_string(),
    }
}

/// Monitors returned by `list`.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorList {
    /// Monitors in provider order.
    pub monitors: Vec<Monitor>,
    /// Whether `--limit` was applied.
    #[serde(skip)]
    pub limited: bool,
}

impl TableDisplay for MonitorList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.limited {
            writeln!(writer, "Showing {} monitor(s) (limited):", self.monitors.len())?;
        } else {
            writeln!(writer, "Found {} monitor(s):", self.monitors.len())?;
        }
        if self.monitors.is_empty() {
            return Ok(());
        }
        rule(writer, '-')?;

        for monitor in &self.monitors {
            writeln!(writer)?;
            writeln!(writer, "ID: {}", display_id(monitor.id))?;
            writeln!(writer, "Name: {}", monitor.name)?;
            writeln!(writer, "Type: {}", monitor.monitor_type)?;
            writeln!(writer, "Status: {}", display_status(monitor))?;
            writeln!(writer, "State: {}", monitor.state())?;
            writeln!(writer, "Tags: {}", display_tags(&monitor.tags))?;
        }
        Ok(())
    }
}

/// ID and name pairs for `list --simple`.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SimpleList {
    /// Rows.
    pub rows: Vec<SimpleRow>,
}

/// One `list --simple` row.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleRow {
    /// Monitor ID.
    pub id: Option<MonitorId>,
    /// Monitor name.
    pub name: String,
}

impl From<&[Monitor]> for SimpleList {
    fn from(monitors: &[Monitor]) -> Self {
        Self {
            rows: monitors
                .iter()
                .map(|m| SimpleRow {
                    id: m.id,
                    name: m.name.clone(),
                })
                .collect(),
        }
    }
}

impl TableDisplay for SimpleList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for row in &self.rows {
            writeln!(writer, "{}\t{}", display_id(row.id), row.name)?;
        }
        Ok(())
    }
}

/// Sorted unique tags for `list --tags-only`.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct TagList {
    /// Tags, sorted.
    pub tags: Vec<String>,
}

impl TagList {
    /// Collects the sorted union of the monitors' tags.
    #[must_use]
    pub fn from_monitors(monitors: &[Monitor]) -> Self {
        let tags: BTreeSet<&String> = monitors.iter().flat_map(|m| m.tags.iter()).collect();
        Self {
            tags: tags.into_iter().cloned().collect(),
        }
    }
}

impl TableDisplay for TagList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for tag in &self.tags {
            writeln!(writer, "{tag}")?;
        }
        Ok(())
    }
}

/// Full view of one monitor for `describe`.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct MonitorDetail {
    /// The monitor.
    pub monitor: Monitor,
}

impl TableDisplay for MonitorDetail {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let m = &self.monitor;
        writeln!(writer, "Monitor Details")?;
        rule(writer, '=')?;
        writeln!(writer, "ID: {}", display_id(m.id))?;
        writeln!(writer, "Name: {}", m.name)?;
        writeln!(writer, "Type: {}", m.monitor_type)?;
        writeln!(writer, "Query: {}", m.query)?;
        writeln!(writer, "Message: {}", m.message)?;
        writeln!(writer, "Overall State: {}", m.state())?;
        writeln!(writer, "Status: {}", display_status(m))?;
        if !m.tags.is_empty() {
            writeln!(writer, "Tags: {}", m.tags.join(", "))?;
        }

        if let Some(thresholds) = &m.options.thresholds {
            let rendered = serde_json::to_string(thresholds)
                .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
            writeln!(writer, "Thresholds: {rendered}")?;
        }
        if let Some(notify) = m.options.notify_no_data {
            writeln!(writer, "Notify No Data: {notify}")?;
        }
        if let Some(notify) = m.options.notify_audit {
            writeln!(writer, "Notify Audit: {notify}")?;
        }

        if m.created_at.is_set() {
            writeln!(writer, "Created: {}", display_timestamp(m.created_at))?;
        }
        if m.modified.is_set() {
            writeln!(writer, "Modified: {}", display_timestamp(m.modified))?;
        }
        rule(writer, '=')?;
        Ok(())
    }
}

/// Monitors a bulk delete is about to remove.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct DeletePreview {
    /// Monitors to delete.
    pub monitors: Vec<Monitor>,
}

impl TableDisplay for DeletePreview {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.monitors.is_empty() {
            writeln!(writer, "No monitors found matching the specified filters")?;
            return Ok(());
        }
        writeln!(writer, "Found {} monitor(s) to delete:", self.monitors.len())?;
        for m in &self.monitors {
            writeln!(
                writer,
                "   ID {}: {} ({})",
                display_id(m.id),
                m.name,
                display_status(m)
            )?;
        }
        writeln!(writer)?;
        writeln!(
            writer,
            "WARNING: This will permanently delete {} monitor(s)!",
            self.monitors.len()
        )?;
        Ok(())
    }
}

/// What a batch did, for headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    /// Bulk delete.
    Delete,
    /// Bulk tag mutation.
    Update,
}

impl BatchAction {
    const fn past(self) -> &'static str {
        match self {
            Self::Delete => "deleted",
            Self::Update => "updated",
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Update => "update",
        }
    }
}

/// Batch results with counts.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Successful entries.
    pub succeeded: usize,
    /// Failed entries.
    pub failed: usize,
    /// Every entry in processing order.
    pub results: BatchReport,
    #[serde(skip)]
    action: BatchAction,
}

impl BatchSummary {
    /// Summarizes a report.
    #[must_use]
    pub fn new(action: BatchAction, report: BatchReport) -> Self {
        Self {
            succeeded: report.succeeded().count(),
            failed: report.failed().count(),
            results: report,
            action,
        }
    }
}

impl TableDisplay for BatchSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Results:")?;
        writeln!(writer, "  Successfully {}: {}", self.action.past(), self.succeeded)?;
        writeln!(writer, "  Failed to {}: {}", self.action.verb(), self.failed)?;

        if self.succeeded > 0 {
            writeln!(writer)?;
            writeln!(writer, "Successfully {} monitors:", self.action.past())?;
            for entry in self.results.succeeded() {
                writeln!(writer, "   ID {}: {}", entry.id, entry.name)?;
                if let Some(tags) = entry.tags.as_deref().filter(|t| !t.is_empty()) {
                    writeln!(writer, "      Tags: {}", tags.join(", "))?;
                }
            }
        }

        if self.failed > 0 {
            writeln!(writer)?;
            writeln!(writer, "Failed to {} monitors:", self.action.verb())?;
            for BatchEntry {
                id, name, status, ..
            } in self.results.failed()
            {
                writeln!(writer, "   ID {id}: {name} - {status}")?;
            }
        }
        Ok(())
    }
}

/// A single-monitor tag mutation.
#[derive(Debug, Clone, Serialize)]
pub struct TagUpdate {
    /// Monitor ID.
    pub id: Option<MonitorId>,
    /// Monitor name.
    pub name: String,
    /// Resulting tags.
    pub tags: Vec<String>,
    #[serde(skip)]
    verb: &'static str,
}

impl TagUpdate {
    /// Builds the view from the updated monitor.
    #[must_use]
    pub fn new(monitor: Monitor, verb: &'static str) -> Self {
        Self {
            id: monitor.id,
            name: monitor.name,
            tags: monitor.tags,
            verb,
        }
    }
}

impl TableDisplay for TagUpdate {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "✓ Tags {} monitor {}", self.verb, display_id(self.id))?;
        writeln!(writer, "Monitor: {}", self.name)?;
        writeln!(writer, "Tags: {}", display_tags(&self.tags))?;
        Ok(())
    }
}

/// Templates applied from one file.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AppliedTemplates {
    /// Applied templates in file order.
    pub applied: Vec<AppliedTemplate>,
}

fn write_applied<W: Write>(writer: &mut W, applied: &AppliedTemplate) -> Result<(), CliError> {
    let action = if applied.created { "Created" } else { "Updated" };
    writeln!(
        writer,
        "   {action} {}: Monitor ID {}",
        applied.template_name,
        display_id(applied.monitor_id)
    )?;
    Ok(())
}

impl TableDisplay for AppliedTemplates {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let created = self.applied.iter().filter(|a| a.created).count();
        let updated = self.applied.len() - created;
        match (created, updated) {
            (0, 0) => writeln!(writer, "No templates applied")?,
            (c, 0) => writeln!(writer, "✓ Created {c} new monitor(s)")?,
            (0, u) => writeln!(writer, "✓ Updated {u} existing monitor(s)")?,
            (c, u) => writeln!(
                writer,
                "✓ Applied {} monitors: {c} created, {u} updated",
                self.applied.len()
            )?,
        }
        for applied in &self.applied {
            write_applied(writer, applied)?;
        }
        Ok(())
    }
}

/// Results of a template directory run.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDirSummary {
    /// Monitors created.
    pub created: usize,
    /// Monitors updated.
    pub updated: usize,
    /// Files that failed.
    pub failed_files: usize,
    /// Per-file results.
    pub report: TemplateRunReport,
}

impl From<TemplateRunReport> for TemplateDirSummary {
    fn from(report: TemplateRunReport) -> Self {
        let created = report.applied().filter(|a| a.created).count();
        Self {
            created,
            updated: report.applied().count() - created,
            failed_files: report.failed().count(),
            report,
        }
    }
}

impl TableDisplay for TemplateDirSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Found {} template file(s)", self.report.files.len())?;
        for file in &self.report.files {
            let name = file
                .path
                .file_name()
                .map_or_else(|| file.path.display().to_string(), |n| n.to_string_lossy().into_owned());
            writeln!(writer)?;
            writeln!(writer, "Applying template: {name}")?;
            for applied in &file.applied {
                write_applied(writer, applied)?;
            }
            if let Some(error) = &file.error {
                writeln!(writer, "   Failed to apply template: {error}")?;
            }
        }
        writeln!(writer)?;
        writeln!(writer, "Applied monitors:")?;
        writeln!(writer, "   Created: {}", self.created)?;
        writeln!(writer, "   Updated: {}", self.updated)?;
        writeln!(writer, "   Total: {}", self.created + self.updated)?;
        if self.failed_files > 0 {
            writeln!(writer, "   Failed files: {}", self.failed_files)?;
        }
        Ok(())
    }
}

/// Existence check for `template --check`.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct TemplatePlanView {
    /// The plan.
    pub plan: TemplatePlan,
}

impl TableDisplay for TemplatePlanView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let plan = &self.plan;
        writeln!(writer, "Templates: {}", plan.total)?;
        writeln!(writer, "Existing: {}", plan.existing.len())?;
        for t in &plan.existing {
            writeln!(
                writer,
                "   {}: {} (ID {})",
                t.template_name,
                t.monitor_name,
                display_id(t.monitor_id)
            )?;
        }
        writeln!(writer, "Missing: {}", plan.missing.len())?;
        for t in &plan.missing {
            writeln!(writer, "   {}: {}", t.template_name, t.monitor_name)?;
        }
        Ok(())
    }
}

/// Simple message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
    /// Whether this is a success message.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    /// Create an informational message.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.success {
            writeln!(writer, "✓ {}", self.message)?;
        } else {
            writeln!(writer, "{}", self.message)?;
        }
        Ok(())
    }
}
