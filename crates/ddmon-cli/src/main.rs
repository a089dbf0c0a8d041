//! ddmon CLI binary entrypoint.
//!
//! This is the main entry point for the `ddmon` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use ddmon_core::{ApiConfig, MonitorManager};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ddmon_cli::cli::{Cli, Commands};
use ddmon_cli::client::DatadogClient;
use ddmon_cli::commands::{
    DeleteAllCommand, DeleteCommand, DescribeCommand, ListCommand, TagAction, TagsCommand,
    TemplateCommand, TerminalPrompt,
};
use ddmon_cli::output::OutputFormat;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ddmon_cli::CliError> {
    let config = ApiConfig::resolve(
        cli.api_key.as_deref(),
        cli.app_key.as_deref(),
        cli.api_url.as_deref(),
        |var| std::env::var(var).ok(),
    )?;
    debug!(?config, "resolved API configuration");

    let manager = MonitorManager::new(DatadogClient::new(&config)?);
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::List(args) => {
            let cmd = ListCommand::new(&manager);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::Describe(args) => {
            let cmd = DescribeCommand::new(&manager);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::Delete(args) => {
            let cmd = DeleteCommand::new(&manager);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::DeleteAll(args) => {
            let cmd = DeleteAllCommand::new(&manager);
            cmd.execute(&mut stdout, &mut TerminalPrompt, &format, &args).await?;
        }
        Commands::Template(args) => {
            let cmd = TemplateCommand::new(&manager);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::AddTags(args) => {
            let cmd = TagsCommand::new(&manager, TagAction::Add);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::RemoveTags(args) => {
            let cmd = TagsCommand::new(&manager, TagAction::Remove);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
    }

    Ok(())
}
