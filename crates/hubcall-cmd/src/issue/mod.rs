//! Issue commands (`hubcall issue`).

pub mod list;
pub mod view;

use clap::Subcommand;
use hubcall_core::Settings;
use serde_json::Value;

use crate::decorate;
use crate::repo_ref::RepoRef;

/// Read issues.
#[derive(Debug, Subcommand)]
pub enum IssueCommand {
    /// List issues in a repository.
    #[command(alias = "ls")]
    List(list::ListArgs),
    /// View an issue.
    View(view::ViewArgs),
}

impl IssueCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &crate::factory::Factory) -> anyhow::Result<()> {
        match self {
            Self::List(args) => args.run(factory).await,
            Self::View(args) => args.run(factory).await,
        }
    }
}

fn decorate_issues(value: &mut Value, repo: &RepoRef, settings: &Settings) {
    decorate::add_properties(
        value,
        &[
            ("owner_name", Value::String(repo.owner().to_string())),
            ("repository_name", Value::String(repo.name().to_string())),
        ],
        settings,
    );
    decorate::alias_field(value, "issue_number", "number", settings);
}
