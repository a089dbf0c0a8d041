//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`list`] - Monitor listing, tag and ID views
//! - [`describe`] - Single monitor details
//! - [`delete`] - Single monitor deletion
//! - [`delete_all`] - Filtered bulk deletion with confirmation
//! - [`template`] - Template application and existence checks
//! - [`tags`] - Tag addition and removal

pub mod delete;
pub mod delete_all;
pub mod describe;
pub mod list;
pub mod tags;
pub mod template;

pub use delete::DeleteCommand;
pub use delete_all::{ConfirmationPrompt, DeleteAllCommand, TerminalPrompt};
pub use describe::DescribeCommand;
pub use list::ListCommand;
pub use tags::{TagAction, TagsCommand};
pub use template::TemplateCommand;
