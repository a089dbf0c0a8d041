//! List command implementation.

use std::io::Write;

use ddmon_core::{MonitorManager, MonitorRepository, TargetRequirement};

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output::{MonitorList, OutputFormat, SimpleList, TagList};

/// List command executor.
pub struct ListCommand<'a, R> {
    manager: &'a MonitorManager<R>,
}

impl<'a, R: MonitorRepository> ListCommand<'a, R> {
    /// Create a new list command.
    #[must_use]
    pub const fn new(manager: &'a MonitorManager<R>) -> Self {
        Self { manager }
    }

    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the flags conflict or the lookup fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &ListArgs,
    ) -> Result<(), CliError> {
        let selector = args.filter_args().into_selector(TargetRequirement::AllowAll)?;
        let limit = args.limit.filter(|l| *l > 0);
        let monitors = self.manager.list(&selector, limit).await?;

        if args.tags_only {
            format.write(writer, &TagList::from_monitors(&monitors))?;
        } else if args.simple {
            format.write(writer, &SimpleList::from(monitors.as_slice()))?;
        } else {
            format.write(
                writer,
                &MonitorList {
                    monitors,
                    limited: limit.is_some(),
                },
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ddmon_core::memory::{InMemoryRepository, RecordedCall};
    use ddmon_core::{Monitor, MonitorError};

    use super::*;
    use crate::cli::Format;

    fn manager() -> MonitorManager<InMemoryRepository> {
        MonitorManager::new(InMemoryRepository::with_monitors([
            Monitor::new("checkout cpu")
                .with_id(1)
                .with_tags(["service:checkout", "env:hml"])
                .with_state("OK"),
            Monitor::new("payments cpu")
                .with_id(2)
                .with_tags(["service:payments", "env:hml"])
                .with_state("Alert"),
            Monitor::new("checkout mem")
                .with_id(3)
                .with_tags(["service:checkout", "env:prd"])
                .with_state("No Data"),
        ]))
    }

    async fn run(manager: &MonitorManager<InMemoryRepository>, args: ListArgs) -> String {
        let mut buf = Vec::new();
        ListCommand::new(manager)
            .execute(&mut buf, &OutputFormat::new(Format::Table), &args)
            .await
            .expect("list");
        String::from_utf8(buf).expect("utf8")
    }

    #[tokio::test]
    async fn list_simple_with_composite_filter() {
        let manager = manager();
        let output = run(
            &manager,
            ListArgs {
                service: Some("checkout".into()),
                env: Some("hml".into()),
                simple: true,
                ..ListArgs::default()
            },
        )
        .await;
        assert_eq!(output, "1\tcheckout cpu\n");
    }

    #[tokio::test]
    async fn list_positional_tag_is_sent_as_tag_filter() {
        let manager = manager();
        run(
            &manager,
            ListArgs {
                tag: Some("env:prd".into()),
                simple: true,
                ..ListArgs::default()
            },
        )
        .await;
        assert_eq!(
            manager.repository().calls(),
            vec![RecordedCall::List {
                tags: vec!["env:prd".into()],
                search: None
            }]
        );
    }

    #[tokio::test]
    async fn list_free_text_search() {
        let manager = manager();
        let output = run(
            &manager,
            ListArgs {
                tags: Some("payments".into()),
                simple: true,
                ..ListArgs::default()
            },
        )
        .await;
        assert_eq!(output, "2\tpayments cpu\n");
    }

    #[tokio::test]
    async fn list_by_status_and_limit() {
        let manager = manager();
        let output = run(
            &manager,
            ListArgs {
                status: Some("no_data".into()),
                limit: Some(5),
                ..ListArgs::default()
            },
        )
        .await;
        assert!(output.contains("Showing 1 monitor(s) (limited):"));
        assert!(output.contains("Name: checkout mem"));
    }

    #[tokio::test]
    async fn list_tags_only_for_one_monitor() {
        let manager = manager();
        let output = run(
            &manager,
            ListArgs {
                monitor_id: Some(3),
                tags_only: true,
                ..ListArgs::default()
            },
        )
        .await;
        assert_eq!(output, "env:prd\nservice:checkout\n");
    }

    #[tokio::test]
    async fn list_monitor_id_with_filters_is_rejected() {
        let manager = manager();
        let args = ListArgs {
            monitor_id: Some(3),
            service: Some("checkout".into()),
            ..ListArgs::default()
        };
        let result = ListCommand::new(&manager)
            .execute(&mut Vec::new(), &OutputFormat::default(), &args)
            .await;
        assert!(matches!(
            result,
            Err(CliError::Monitor(MonitorError::Validation { .. }))
        ));
        assert!(manager.repository().calls().is_empty());
    }
}
