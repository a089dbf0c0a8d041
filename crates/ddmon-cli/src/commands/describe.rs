//! Describe command implementation.

use std::io::Write;

use ddmon_core::{MonitorError, MonitorId, MonitorManager, MonitorRepository};

use crate::cli::{DescribeArgs, Format};
use crate::error::CliError;
use crate::output::{MonitorDetail, OutputFormat};

/// Describe command executor.
pub struct DescribeCommand<'a, R> {
    manager: &'a MonitorManager<R>,
}

impl<'a, R: MonitorRepository> DescribeCommand<'a, R> {
    /// Create a new describe command.
    #[must_use]
    pub const fn new(manager: &'a MonitorManager<R>) -> Self {
        Self { manager }
    }

    /// Execute the describe command.
    ///
    /// `--json` forces JSON output regardless of `--format`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is zero or the monitor cannot be fetched.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &DescribeArgs,
    ) -> Result<(), CliError> {
        if args.monitor_id == 0 {
            return Err(MonitorError::validation("monitor ID must be positive").into());
        }

        let monitor = self.manager.describe(MonitorId(args.monitor_id)).await?;
        let format = if args.json {
            OutputFormat::new(Format::Json)
        } else {
            format.clone()
        };
        format.write(writer, &MonitorDetail { monitor })
    }
}
