//! Template command implementation.

use std::io::Write;

use ddmon_core::{MonitorManager, MonitorRepository, Placeholders, UpsertMode};

use crate::cli::TemplateArgs;
use crate::error::CliError;
use crate::output::{AppliedTemplates, OutputFormat, TemplateDirSummary, TemplatePlanView};

/// Template command executor.
pub struct TemplateCommand<'a, R> {
    manager: &'a MonitorManager<R>,
}

impl<'a, R: MonitorRepository> TemplateCommand<'a, R> {
    /// Create a new template command.
    #[must_use]
    pub const fn new(manager: &'a MonitorManager<R>) -> Self {
        Self { manager }
    }

    /// Execute the template command.
    ///
    /// With `--file` one document is applied and its first failure aborts
    /// the command. Without it every `*.json` file in `--template-dir` is
    /// applied and failing files are reported in the summary.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid placeholders, `--check` without
    /// `--file`, an unreadable template source, or a rejected template in
    /// single-file mode.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &TemplateArgs,
    ) -> Result<(), CliError> {
        let placeholders = Placeholders::new(&args.service, &args.env, &args.namespace)?;
        let mode = if args.no_upsert {
            UpsertMode::CreateOnly
        } else {
            UpsertMode::Upsert
        };

        if args.check {
            let Some(file) = &args.file else {
                return Err(CliError::InvalidArgument(
                    "--check requires --file".to_string(),
                ));
            };
            let plan = self.manager.plan_template_file(file, &placeholders).await?;
            return format.write(writer, &TemplatePlanView { plan });
        }

        match &args.file {
            Some(file) => {
                let applied = self
                    .manager
                    .apply_template_file(file, &placeholders, &args.tags, mode)
                    .await?;
                format.write(writer, &AppliedTemplates { applied })
            }
            None => {
                let report = self
                    .manager
                    .apply_template_dir(&args.template_dir, &placeholders, &args.tags, mode)
                    .await?;
                format.write(writer, &TemplateDirSummary::from(report))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use ddmon_core::memory::{InMemoryRepository, Operation};
    use ddmon_core::{Monitor, MonitorError};
    use tempfile::TempDir;

    use super::*;

    const CPU: &str = r#"{
        "name": "[{env}] {service} CPU",
        "type": "query alert",
        "query": "avg(last_5m):avg:k8s.cpu{service:{service},env:{env}} by {service} > 90",
        "message": "CPU high on {service} in {namespace}",
        "tags": ["team:core"]
    }"#;

    const PAIR: &str = r#"{
        "templates": [
            {"name": "memory", "config": {"name": "[{env}] {service} memory", "type": "query alert", "query": "q"}},
            {"name": "restarts", "config": {"name": "[{env}] {service} restarts", "type": "query alert", "query": "q"}}
        ]
    }"#;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).expect("write template");
        path
    }

    fn args(dir: &Path) -> TemplateArgs {
        TemplateArgs {
            service: "checkout".into(),
            env: "hml".into(),
            namespace: "shop".into(),
            file: None,
            template_dir: dir.to_path_buf(),
            no_upsert: false,
            tags: Vec::new(),
            check: false,
        }
    }

    async fn run(
        manager: &MonitorManager<InMemoryRepository>,
        args: &TemplateArgs,
    ) -> Result<String, CliError> {
        let mut buf = Vec::new();
        TemplateCommand::new(manager)
            .execute(&mut buf, &OutputFormat::default(), args)
            .await?;
        Ok(String::from_utf8(buf).expect("utf8"))
    }

    #[tokio::test]
    async fn single_file_creates_customized_monitor() {
        let dir = TempDir::new().expect("tempdir");
        let manager = MonitorManager::new(InMemoryRepository::new());
        let args = TemplateArgs {
            file: Some(write(dir.path(), "cpu.json", CPU)),
            tags: vec!["owner:payments".into()],
            ..args(dir.path())
        };

        let output = run(&manager, &args).await.expect("template");
        assert!(output.contains("✓ Created 1 new monitor(s)"));

        let monitor = manager.repository().monitor(1).expect("created");
        assert_eq!(monitor.name, "[HML] checkout CPU");
        assert!(monitor.query.contains("service:checkout,env:hml"));
        assert!(monitor.query.ends_with("by {service} > 90"));
        assert_eq!(monitor.message, "CPU high on checkout in shop");
        assert_eq!(
            monitor.tags,
            vec![
                "team:core",
                "service:checkout",
                "env:hml",
                "namespace:shop",
                "owner:payments"
            ]
        );
    }

    #[tokio::test]
    async fn reapplying_updates_instead_of_duplicating() {
        let dir = TempDir::new().expect("tempdir");
        let manager = MonitorManager::new(InMemoryRepository::with_monitors([Monitor::new(
            "[HML] checkout CPU",
        )
        .with_id(40)]));
        let args = TemplateArgs {
            file: Some(write(dir.path(), "cpu.json", CPU)),
            ..args(dir.path())
        };

        let output = run(&manager, &args).await.expect("template");
        assert!(output.contains("✓ Updated 1 existing monitor(s)"));
        assert!(output.contains("Updated Single Template: Monitor ID 40"));
        assert_eq!(manager.repository().count(Operation::Create), 0);
    }

    #[tokio::test]
    async fn no_upsert_surfaces_duplicate_error() {
        let dir = TempDir::new().expect("tempdir");
        let manager = MonitorManager::new(InMemoryRepository::with_monitors([Monitor::new(
            "[HML] checkout CPU",
        )
        .with_id(40)]));
        let args = TemplateArgs {
            file: Some(write(dir.path(), "cpu.json", CPU)),
            no_upsert: true,
            ..args(dir.path())
        };

        let result = run(&manager, &args).await;
        assert!(matches!(
            result,
            Err(CliError::Monitor(MonitorError::TemplateApply { .. }))
        ));
        assert_eq!(manager.repository().count(Operation::List), 0);
    }

    #[tokio::test]
    async fn directory_mode_applies_every_file() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a-cpu.json", CPU);
        write(dir.path(), "b-pair.json", PAIR);
        write(dir.path(), "c-broken.json", "{ not json");
        write(dir.path(), "notes.txt", "ignored");
        let manager = MonitorManager::new(InMemoryRepository::new());

        let output = run(&manager, &args(dir.path())).await.expect("template");
        assert!(output.contains("Found 3 template file(s)"));
        assert!(output.contains("Applying template: b-pair.json"));
        assert!(output.contains("   Created: 3"));
        assert!(output.contains("   Failed files: 1"));
        assert_eq!(manager.repository().monitors().len(), 3);
    }

    #[tokio::test]
    async fn invalid_environment_is_rejected_before_any_call() {
        let dir = TempDir::new().expect("tempdir");
        let manager = MonitorManager::new(InMemoryRepository::new());
        let args = TemplateArgs {
            env: "staging".into(),
            ..args(dir.path())
        };

        let err = run(&manager, &args).await.expect_err("should fail");
        assert!(err.to_string().contains("invalid environment: staging"));
        assert!(manager.repository().calls().is_empty());
    }

    #[tokio::test]
    async fn check_reports_existing_and_missing() {
        let dir = TempDir::new().expect("tempdir");
        let manager = MonitorManager::new(InMemoryRepository::with_monitors([Monitor::new(
            "[HML] checkout memory",
        )
        .with_id(8)]));
        let args = TemplateArgs {
            file: Some(write(dir.path(), "pair.json", PAIR)),
            check: true,
            ..args(dir.path())
        };

        let output = run(&manager, &args).await.expect("check");
        assert!(output.contains("Existing: 1"));
        assert!(output.contains("memory: [HML] checkout memory (ID 8)"));
        assert!(output.contains("Missing: 1"));
        assert!(!manager.repository().has_writes());
    }

    #[tokio::test]
    async fn check_requires_file() {
        let dir = TempDir::new().expect("tempdir");
        let manager = MonitorManager::new(InMemoryRepository::new());
        let args = TemplateArgs {
            check: true,
            ..args(dir.path())
        };
        let result = run(&manager, &args).await;
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
