//! Add-tags and remove-tags command implementation.

use std::io::Write;

use ddmon_core::{
    MonitorManager, MonitorRepository, TagMutation, TagMutationOutcome, TargetRequirement,
};

use crate::cli::TagArgs;
use crate::error::CliError;
use crate::output::{BatchAction, BatchSummary, Message, OutputFormat, TagUpdate};

/// Whether tags are added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    /// `add-tags`.
    Add,
    /// `remove-tags`.
    Remove,
}

impl TagAction {
    fn mutation(self, tags: Vec<String>) -> TagMutation {
        match self {
            Self::Add => TagMutation::Add(tags),
            Self::Remove => TagMutation::Remove(tags),
        }
    }
}

/// Tag command executor.
pub struct TagsCommand<'a, R> {
    manager: &'a MonitorManager<R>,
    action: TagAction,
}

impl<'a, R: MonitorRepository> TagsCommand<'a, R> {
    /// Create a new tag command.
    #[must_use]
    pub const fn new(manager: &'a MonitorManager<R>, action: TagAction) -> Self {
        Self { manager, action }
    }

    /// Execute the tag command.
    ///
    /// # Errors
    ///
    /// Returns an error if no target or no tag is given, the filters
    /// conflict, the lookup fails, or a single-monitor update fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &TagArgs,
    ) -> Result<(), CliError> {
        let selector = args.filter_args().into_selector(TargetRequirement::Explicit)?;
        let tags: Vec<String> = args
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let mutation = self.action.mutation(tags);
        let verb = mutation.verb();

        match self.manager.mutate_tags(&selector, mutation).await? {
            TagMutationOutcome::Single(monitor) => {
                format.write(writer, &TagUpdate::new(monitor, verb))
            }
            TagMutationOutcome::Batch(report) if report.is_empty() => format.write(
                writer,
                &Message::info("No monitors found matching the specified filters"),
            ),
            TagMutationOutcome::Batch(report) => {
                format.write(writer, &BatchSummary::new(BatchAction::Update, report))
            }
        }
    }
}
