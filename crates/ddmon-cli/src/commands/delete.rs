//! Delete command implementation.

use std::io::Write;

use ddmon_core::{MonitorError, MonitorId, MonitorManager, MonitorRepository};

use crate::cli::DeleteArgs;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Delete command executor.
pub struct DeleteCommand<'a, R> {
    manager: &'a MonitorManager<R>,
}

impl<'a, R: MonitorRepository> DeleteCommand<'a, R> {
    /// Create a new delete command.
    #[must_use]
    pub const fn new(manager: &'a MonitorManager<R>) -> Self {
        Self { manager }
    }

    /// Execute the delete command.
    ///
    /// # Errors
    ///
    /// Returns an error if `--confirm` is missing, the ID is zero, or the
    /// provider rejects the deletion.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &DeleteArgs,
    ) -> Result<(), CliError> {
        if !args.confirm {
            return Err(MonitorError::validation("please use --confirm to confirm deletion").into());
        }
        if args.monitor_id == 0 {
            return Err(MonitorError::validation("monitor ID must be positive").into());
        }

        let id = MonitorId(args.monitor_id);
        self.manager.delete(id).await?;
        format.write(
            writer,
            &Message::success(format!("Monitor {id} deleted successfully")),
        )
    }
}
