//! Delete-all command implementation.

use std::io::Write;

use ddmon_core::{MonitorManager, MonitorRepository, TargetRequirement};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;

use crate::cli::DeleteAllArgs;
use crate::error::CliError;
use crate::output::{BatchAction, BatchSummary, DeletePreview, Message, OutputFormat};

const CONFIRM_PROMPT: &str = "Type 'yes' to confirm deletion";

/// Source of the typed confirmation answer.
pub trait ConfirmationPrompt {
    /// Shows `prompt` and returns the raw answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn ask(&mut self, prompt: &str) -> Result<String, CliError>;
}

/// Interactive prompt on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl ConfirmationPrompt for TerminalPrompt {
    fn ask(&mut self, prompt: &str) -> Result<String, CliError> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CliError::Prompt(e.to_string()))
    }
}

/// Delete-all command executor.
pub struct DeleteAllCommand<'a, R> {
    manager: &'a MonitorManager<R>,
}

fn confirmed(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

impl<'a, R: MonitorRepository> DeleteAllCommand<'a, R> {
    /// Create a new delete-all command.
    #[must_use]
    pub const fn new(manager: &'a MonitorManager<R>) -> Self {
        Self { manager }
    }

    /// Execute the delete-all command.
    ///
    /// Without `--yes` the matching set is shown and `prompt` must answer
    /// `yes`; any other answer cancels without deleting anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the filters conflict, JSON output is requested
    /// without `--yes`, the prompt fails, or the lookup fails. Per-monitor failures are part of
    /// the printed summary.
    pub async fn execute<W: Write, P: ConfirmationPrompt>(
        &self,
        writer: &mut W,
        prompt: &mut P,
        format: &OutputFormat,
        args: &DeleteAllArgs,
    ) -> Result<(), CliError> {
        if format.is_json() && !args.yes {
            return Err(CliError::InvalidArgument(
                "--yes is required with --format json".to_string(),
            ));
        }

        let selector = args.filter_args().into_selector(TargetRequirement::AllowAll)?;
        let monitors = self.manager.preview_delete(&selector).await?;
        if monitors.is_empty() {
            return format.write(
                writer,
                &Message::info("No monitors found matching the specified filters"),
            );
        }

        if !format.is_json() {
            format.write(
                writer,
                &DeletePreview {
                    monitors: monitors.clone(),
                },
            )?;
        }

        if !args.yes {
            writer.flush()?;
            let answer = prompt.ask(CONFIRM_PROMPT)?;
            if !confirmed(&answer) {
                return format.write(writer, &Message::info("Deletion cancelled"));
            }
        }

        let report = self.manager.delete_resolved(monitors).await;
        format.write(writer, &BatchSummary::new(BatchAction::Delete, report))
    }
}

#[cfg(test)]
mod tests {
    use ddmon_core::Monitor;
    use ddmon_core::memory::{InMemoryRepository, Operation};
    use test_case::test_case;

    use super::*;
    use crate::cli::Format;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::with_monitors([
            Monitor::new("a").with_id(1).with_tags(["service:x"]),
            Monitor::new("b").with_id(2).with_tags(["service:x"]),
            Monitor::new("c").with_id(3).with_tags(["service:y"]),
        ])
    }

    struct ScriptedPrompt {
        answer: Option<&'static str>,
        asked: Vec<String>,
    }

    impl ScriptedPrompt {
        fn answering(answer: &'static str) -> Self {
            Self {
                answer: Some(answer),
                asked: Vec::new(),
            }
        }

        fn unavailable() -> Self {
            Self {
                answer: None,
                asked: Vec::new(),
            }
        }
    }

    impl ConfirmationPrompt for ScriptedPrompt {
        fn ask(&mut self, prompt: &str) -> Result<String, CliError> {
            self.asked.push(prompt.to_string());
            self.answer
                .map(str::to_string)
                .ok_or_else(|| CliError::Prompt("not a terminal".into()))
        }
    }

    fn args() -> DeleteAllArgs {
        DeleteAllArgs {
            service: Some("x".into()),
            ..DeleteAllArgs::default()
        }
    }

    async fn run(
        manager: &MonitorManager<InMemoryRepository>,
        format: Format,
        args: &DeleteAllArgs,
        prompt: &mut ScriptedPrompt,
    ) -> Result<String, CliError> {
        let mut buf = Vec::new();
        DeleteAllCommand::new(manager)
            .execute(&mut buf, prompt, &OutputFormat::new(format), args)
            .await?;
        Ok(String::from_utf8(buf).expect("utf8"))
    }

    #[test_case("yes", true ; "lowercase")]
    #[test_case("  YES \n", true ; "uppercase padded")]
    #[test_case("y\n", false ; "abbreviation")]
    #[test_case("", false ; "end of input")]
    fn confirmation_answers(answer: &str, expected: bool) {
        assert_eq!(confirmed(answer), expected);
    }

    #[tokio::test]
    async fn confirmed_prompt_deletes_matching_monitors() {
        let manager = MonitorManager::new(repo());
        let mut prompt = ScriptedPrompt::answering("yes");
        let output = run(&manager, Format::Table, &args(), &mut prompt)
            .await
            .expect("delete-all");
        assert!(output.contains("WARNING: This will permanently delete 2 monitor(s)!"));
        assert_eq!(prompt.asked, vec![CONFIRM_PROMPT]);
        assert!(output.contains("Successfully deleted: 2"));
        assert_eq!(manager.repository().count(Operation::Delete), 2);
        assert!(manager.repository().monitor(3).is_some());
    }

    #[tokio::test]
    async fn declined_prompt_deletes_nothing() {
        let manager = MonitorManager::new(repo());
        let mut prompt = ScriptedPrompt::answering("no");
        let output = run(&manager, Format::Table, &args(), &mut prompt)
            .await
            .expect("delete-all");
        assert!(output.ends_with("Deletion cancelled\n"));
        assert!(!manager.repository().has_writes());
    }

    #[tokio::test]
    async fn prompt_failure_deletes_nothing() {
        let manager = MonitorManager::new(repo());
        let mut prompt = ScriptedPrompt::unavailable();
        let result = run(&manager, Format::Table, &args(), &mut prompt).await;
        assert!(matches!(result, Err(CliError::Prompt(_))));
        assert_eq!(prompt.asked.len(), 1);
        assert!(!manager.repository().has_writes());
    }

    #[tokio::test]
    async fn empty_match_skips_prompt() {
        let manager = MonitorManager::new(repo());
        let args = DeleteAllArgs {
            service: Some("nothing".into()),
            ..DeleteAllArgs::default()
        };
        let mut prompt = ScriptedPrompt::unavailable();
        let output = run(&manager, Format::Table, &args, &mut prompt)
            .await
            .expect("delete-all");
        assert_eq!(output, "No monitors found matching the specified filters\n");
        assert!(prompt.asked.is_empty());
    }

    #[tokio::test]
    async fn partial_failure_is_summarized() {
        let manager = MonitorManager::new(repo().failing(Operation::Delete, 2));
        let args = DeleteAllArgs {
            yes: true,
            ..args()
        };
        let mut prompt = ScriptedPrompt::unavailable();
        let output = run(&manager, Format::Table, &args, &mut prompt)
            .await
            .expect("delete-all");
        assert!(prompt.asked.is_empty());
        assert!(output.contains("Successfully deleted: 1"));
        assert!(output.contains("Failed to delete: 1"));
        assert!(output.contains("ID 2: b - failed:"));
    }

    #[tokio::test]
    async fn json_requires_yes() {
        let manager = MonitorManager::new(repo());
        let mut prompt = ScriptedPrompt::answering("yes");
        let result = run(&manager, Format::Json, &args(), &mut prompt).await;
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
        assert!(manager.repository().calls().is_empty());
    }

    #[tokio::test]
    async fn json_with_yes_prints_only_summary() {
        let manager = MonitorManager::new(repo());
        let args = DeleteAllArgs {
            yes: true,
            ..args()
        };
        let mut prompt = ScriptedPrompt::unavailable();
        let output = run(&manager, Format::Json, &args, &mut prompt)
            .await
            .expect("delete-all");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(value["succeeded"], 2);
        assert_eq!(value["failed"], 0);
        assert_eq!(value["results"][0]["status"], "deleted");
    }
}
