//! Monitor manager tying resolution, mutation and templates together.
//!
//! [`MonitorManager`] is the entry point used by the command line. Every call
//! resolves its working set fresh from the repository; nothing is cached
//! between calls.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::batch::{BatchExecutor, BatchOperation, BatchReport};
use crate::error::{MonitorError, Result};
use crate::filter::{FilterResolver, MonitorSelector};
use crate::repository::MonitorRepository;
use crate::tags::{TagMutation, TagMutator};
use crate::template::{self, Placeholders, TemplateDocument};
use crate::types::{Monitor, MonitorId};
use crate::upsert::{UpsertMode, Upserter};

/// Result of a tag mutation request.
#[derive(Debug, Clone, PartialEq)]
pub enum TagMutationOutcome {
    /// A single monitor addressed by ID.
    Single(Monitor),
    /// A filtered set.
    Batch(BatchReport),
}

/// One template applied to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedTemplate {
    /// Template name within its file.
    pub template_name: String,
    /// Resulting monitor name.
    pub monitor_name: String,
    /// Resulting monitor ID.
    pub monitor_id: Option<MonitorId>,
    /// True if the monitor was created rather than updated.
    pub created: bool,
}

/// Per-file result of a template directory run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFileResult {
    /// Template file.
    pub path: PathBuf,
    /// Templates applied before completion or failure.
    pub applied: Vec<AppliedTemplate>,
    /// Why the file failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`MonitorManager::apply_template_dir`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateRunReport {
    /// Files in processing order.
    pub files: Vec<TemplateFileResult>,
}

impl TemplateRunReport {
    /// Files that failed.
    pub fn failed(&self) -> impl Iterator<Item = &TemplateFileResult> {
        self.files.iter().filter(|f| f.error.is_some())
    }

    /// All templates applied across files.
    pub fn applied(&self) -> impl Iterator<Item = &AppliedTemplate> {
        self.files.iter().flat_map(|f| f.applied.iter())
    }
}

/// A template checked against the provider without writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTemplate {
    /// Template name within its file.
    pub template_name: String,
    /// Monitor name after substitution.
    pub monitor_name: String,
    /// Existing monitor that would be updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_id: Option<MonitorId>,
}

/// Result of [`MonitorManager::plan_template_file`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplatePlan {
    /// Number of templates in the file.
    pub total: usize,
    /// Templates whose monitor already exists.
    pub existing: Vec<PlannedTemplate>,
    /// Templates whose monitor would be created.
    pub missing: Vec<PlannedTemplate>,
}

/// High-level monitor operations over a [`MonitorRepository`].
#[derive(Debug)]
pub struct MonitorManager<R> {
    repo: R,
}

impl<R: MonitorRepository> MonitorManager<R> {
    /// Creates a manager owning the repository.
    #[must_use]
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the repository.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repo
    }

    /// Resolves the selector, keeping at most `limit` monitors.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the lookup fails.
    pub async fn list(
        &self,
        selector: &MonitorSelector,
        limit: Option<usize>,
    ) -> Result<Vec<Monitor>> {
        let mut monitors = FilterResolver::new(&self.repo).resolve(selector).await?;
        if let Some(limit) = limit {
            monitors.truncate(limit);
        }
        Ok(monitors)
    }

    /// Fetches one monitor.
    ///
    /// # Errors
    ///
    /// Returns the repository error.
    pub async fn describe(&self, id: MonitorId) -> Result<Monitor> {
        self.repo.get(id).await
    }

    /// Deletes one monitor.
    ///
    /// # Errors
    ///
    /// Returns the repository error.
    pub async fn delete(&self, id: MonitorId) -> Result<()> {
        self.repo.delete(id).await?;
        info!(monitor_id = %id, "monitor deleted");
        Ok(())
    }

    /// Resolves the monitors a bulk delete would remove.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the lookup fails.
    pub async fn preview_delete(&self, selector: &MonitorSelector) -> Result<Vec<Monitor>> {
        FilterResolver::new(&self.repo).resolve(selector).await
    }

    /// Deletes an already resolved set, one monitor at a time.
    pub async fn delete_resolved(&self, monitors: Vec<Monitor>) -> BatchReport {
        let report = BatchExecutor::new(&self.repo)
            .run(monitors, &BatchOperation::Delete)
            .await;
        info!(
            deleted = report.succeeded().count(),
            failed = report.failed().count(),
            "bulk delete finished"
        );
        report
    }

    /// Adds or removes tags.
    ///
    /// A [`MonitorSelector::ById`] mutation fails as a whole; a filtered one
    /// runs as a batch.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Validation` if the mutation carries no tags, or
    /// the repository error for single-monitor mutations and failed lookups.
    pub async fn mutate_tags(
        &self,
        selector: &MonitorSelector,
        mutation: TagMutation,
    ) -> Result<TagMutationOutcome> {
        if mutation.tags().is_empty() {
            return Err(MonitorError::validation("at least one --tag is required"));
        }

        if let MonitorSelector::ById(id) = selector {
            let monitor = TagMutator::new(&self.repo).apply(*id, &mutation).await?;
            return Ok(TagMutationOutcome::Single(monitor));
        }

        let monitors = FilterResolver::new(&self.repo).resolve(selector).await?;
        let report = BatchExecutor::new(&self.repo)
            .run(monitors, &BatchOperation::from(mutation))
            .await;
        Ok(TagMutationOutcome::Batch(report))
    }

    /// Applies every template of one file.
    ///
    /// The first failing template stops the file.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Template` if the file cannot be loaded or a
    /// template is not a monitor, and `MonitorError::TemplateApply` if the
    /// provider rejects a template.
    pub async fn apply_template_file(
        &self,
        path: &Path,
        placeholders: &Placeholders,
        extra_tags: &[String],
        mode: UpsertMode,
    ) -> Result<Vec<AppliedTemplate>> {
        let mut applied = Vec::new();
        self.apply_document(path, placeholders, extra_tags, mode, &mut applied)
            .await?;
        Ok(applied)
    }

    async fn apply_document(
        &self,
        path: &Path,
        placeholders: &Placeholders,
        extra_tags: &[String],
        mode: UpsertMode,
        applied: &mut Vec<AppliedTemplate>,
    ) -> Result<()> {
        let document = TemplateDocument::load(path).await?;
        let upserter = Upserter::new(&self.repo, mode);

        for entry in document.entries {
            let config = template::customize(&entry.config, placeholders, extra_tags);
            let definition = template::into_monitor(&entry.name, config)?;
            let outcome =
                upserter
                    .apply(&definition)
                    .await
                    .map_err(|err| MonitorError::TemplateApply {
                        template: entry.name.clone(),
                        source: Box::new(err),
                    })?;

            info!(
                template = %entry.name,
                name = %outcome.monitor.name,
                created = outcome.created,
                "template applied"
            );
            applied.push(AppliedTemplate {
                template_name: entry.name,
                monitor_name: outcome.monitor.name,
                monitor_id: outcome.monitor.id,
                created: outcome.created,
            });
        }
        Ok(())
    }

    /// Applies every `*.json` template file in a directory, in name order.
    ///
    /// A failing file is recorded and the next one is processed.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Template` if the directory is missing or holds
    /// no template files.
    pub async fn apply_template_dir(
        &self,
        dir: &Path,
        placeholders: &Placeholders,
        extra_tags: &[String],
        mode: UpsertMode,
    ) -> Result<TemplateRunReport> {
        let mut report = TemplateRunReport::default();

        for path in template::discover_templates(dir).await? {
            let mut applied = Vec::new();
            let error = match self
                .apply_document(&path, placeholders, extra_tags, mode, &mut applied)
                .await
            {
                Ok(()) => None,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "template file failed");
                    Some(err.to_string())
                }
            };
            report.files.push(TemplateFileResult {
                path,
                applied,
                error,
            });
        }

        Ok(report)
    }

    /// Reports which templates of a file already have a monitor. Never
    /// writes.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Template` for a malformed file or the
    /// repository error if the lookup fails.
    pub async fn plan_template_file(
        &self,
        path: &Path,
        placeholders: &Placeholders,
    ) -> Result<TemplatePlan> {
        let document = TemplateDocument::load(path).await?;
        let upserter = Upserter::new(&self.repo, UpsertMode::Upsert);
        let mut plan = TemplatePlan {
            total: document.len(),
            ..TemplatePlan::default()
        };

        for entry in document.entries {
            let config = template::customize(&entry.config, placeholders, &[]);
            let definition = template::into_monitor(&entry.name, config)?;
            let monitor_id = upserter.check(&definition).await?;
            let planned = PlannedTemplate {
                template_name: entry.name,
                monitor_name: definition.name,
                monitor_id,
            };
            if monitor_id.is_some() {
                plan.existing.push(planned);
            } else {
                plan.missing.push(planned);
            }
        }

        Ok(plan)
    }
}
