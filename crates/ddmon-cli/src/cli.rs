//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ddmon_core::{FilterArgs, parse_tag_list};

/// ddmon - manage Datadog monitors for Kubernetes workloads.
#[derive(Parser, Debug, Clone)]
#[command(name = "ddmon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Datadog API key (falls back to DATADOG_API_KEY).
    #[arg(long, global = true, env = "DD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Datadog application key (falls back to DATADOG_APP_KEY).
    #[arg(long, global = true, env = "DD_APP_KEY", hide_env_values = true)]
    pub app_key: Option<String>,

    /// Datadog API root (defaults to the US1 site).
    #[arg(long, global = true, env = "DD_API_URL")]
    pub api_url: Option<String>,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List existing monitors.
    ///
    /// A positional tag such as `service:checkout` is used as `--tags`.
    List(ListArgs),

    /// Show detailed monitor information.
    Describe(DescribeArgs),

    /// Delete a single monitor by ID.
    Delete(DeleteArgs),

    /// Delete every monitor matching the filters.
    DeleteAll(DeleteAllArgs),

    /// Apply monitor templates from JSON files.
    Template(TemplateArgs),

    /// Add tags to one monitor or every monitor matching filters.
    AddTags(TagArgs),

    /// Remove tags from one monitor or every monitor matching filters.
    RemoveTags(TagArgs),
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Tag to filter by, e.g. `service:checkout`.
    pub tag: Option<String>,

    /// Filter by service.
    #[arg(long)]
    pub service: Option<String>,

    /// Filter by environment.
    #[arg(long)]
    pub env: Option<String>,

    /// Filter by namespace.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Exact tag when it contains `:`, free-text search otherwise.
    #[arg(long)]
    pub tags: Option<String>,

    /// Filter by monitor state (e.g. "No Data", Alert, Warn, OK).
    #[arg(long)]
    pub status: Option<String>,

    /// Show at most this many monitors.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print only ID and name.
    #[arg(long)]
    pub simple: bool,

    /// Print only the sorted unique tags.
    #[arg(long)]
    pub tags_only: bool,

    /// A single monitor.
    #[arg(long)]
    pub monitor_id: Option<u64>,
}

impl ListArgs {
    /// The `--tags` value, falling back to a positional tag containing `:`.
    #[must_use]
    pub fn effective_tags(&self) -> Option<&str> {
        self.tags
            .as_deref()
            .or_else(|| self.tag.as_deref().filter(|t| t.contains(':')))
    }

    /// Converts the flags into raw filter input.
    #[must_use]
    pub fn filter_args(&self) -> FilterArgs {
        let (tags, search) = match self.effective_tags() {
            Some(value) if value.contains(':') => (parse_tag_list(value), None),
            Some(value) => (Vec::new(), Some(value.to_string())),
            None => (Vec::new(), None),
        };
        FilterArgs {
            monitor_id: self.monitor_id,
            service: self.service.clone(),
            env: self.env.clone(),
            namespace: self.namespace.clone(),
            tags,
            search,
            query: None,
            state: self.status.clone(),
        }
    }
}

/// Arguments for the describe command.
#[derive(Args, Debug, Clone)]
pub struct DescribeArgs {
    /// Monitor ID.
    #[arg(long)]
    pub monitor_id: u64,

    /// Print the raw monitor as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the delete command.
#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Monitor ID.
    #[arg(long)]
    pub monitor_id: u64,

    /// Confirm deletion.
    #[arg(long)]
    pub confirm: bool,
}

/// Arguments for the delete-all command.
#[derive(Args, Debug, Clone, Default)]
pub struct DeleteAllArgs {
    /// Filter by service.
    #[arg(long)]
    pub service: Option<String>,

    /// Filter by environment.
    #[arg(long)]
    pub env: Option<String>,

    /// Filter by namespace.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Filter by tags (comma-separated).
    #[arg(long)]
    pub tags: Option<String>,

    /// Filter by monitor state.
    #[arg(long)]
    pub status: Option<String>,

    /// Skip the interactive confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl DeleteAllArgs {
    /// Converts the flags into raw filter input.
    #[must_use]
    pub fn filter_args(&self) -> FilterArgs {
        FilterArgs {
            service: self.service.clone(),
            env: self.env.clone(),
            namespace: self.namespace.clone(),
            tags: self.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            state: self.status.clone(),
            ..FilterArgs::default()
        }
    }
}

/// Arguments for the template command.
#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Service name.
    #[arg(long)]
    pub service: String,

    /// Environment: dev, hml, prd or corp.
    #[arg(long)]
    pub env: String,

    /// Kubernetes namespace.
    #[arg(long)]
    pub namespace: String,

    /// Template file; when absent every `*.json` in `--template-dir` is applied.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Directory containing JSON templates.
    #[arg(long, default_value = "templates")]
    pub template_dir: PathBuf,

    /// Only create new monitors; fail if one already exists.
    #[arg(long)]
    pub no_upsert: bool,

    /// Additional tag (repeatable).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Report which monitors already exist without writing.
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the add-tags and remove-tags commands.
#[derive(Args, Debug, Clone, Default)]
pub struct TagArgs {
    /// A single monitor.
    #[arg(long)]
    pub monitor_id: Option<u64>,

    /// Filter by service.
    #[arg(long)]
    pub service: Option<String>,

    /// Filter by environment.
    #[arg(long)]
    pub env: Option<String>,

    /// Filter by namespace.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Filter by tags (comma-separated).
    #[arg(long)]
    pub filter_tags: Option<String>,

    /// Provider query, e.g. `service:(a OR b)`.
    #[arg(long)]
    pub query: Option<String>,

    /// Filter by monitor state when targeting several monitors.
    #[arg(long)]
    pub status: Option<String>,

    /// Tag to add or remove (repeatable, at least one).
    #[arg(long = "tag", required = true)]
    pub tags: Vec<String>,
}

impl TagArgs {
    /// Converts the flags into raw filter input.
    #[must_use]
    pub fn filter_args(&self) -> FilterArgs {
        FilterArgs {
            monitor_id: self.monitor_id,
            service: self.service.clone(),
            env: self.env.clone(),
            namespace: self.namespace.clone(),
            tags: self
                .filter_tags
                .as_deref()
                .map(parse_tag_list)
                .unwrap_or_default(),
            search: None,
            query: self.query.clone(),
            state: self.status.clone(),
        }
    }
}
