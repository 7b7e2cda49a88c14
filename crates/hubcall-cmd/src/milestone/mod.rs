//! Milestone commands (`hubcall milestone`).

pub mod create;
pub mod delete;
pub mod list;

use clap::Subcommand;
use hubcall_core::Settings;
use serde_json::Value;

use crate::decorate;
use crate::repo_ref::RepoRef;

/// Manage milestones.
#[derive(Debug, Subcommand)]
pub enum MilestoneCommand {
    /// Create a milestone.
    Create(create::CreateArgs),
    /// Delete a milestone.
    Delete(delete::DeleteArgs),
    /// List milestones.
    #[command(alias = "ls")]
    List(list::ListArgs),
}

impl MilestoneCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &crate::factory::Factory) -> anyhow::Result<()> {
        match self {
            Self::Create(args) => args.run(factory).await,
            Self::Delete(args) => args.run(factory).await,
            Self::List(args) => args.run(factory).await,
        }
    }
}

fn decorate_milestones(value: &mut Value, repo: &RepoRef, settings: &Settings) {
    decorate::add_properties(
        value,
        &[(
            "repository_url",
            Value::String(repo.html_url(&settings.api_host_name)),
        )],
        settings,
    );
    decorate::alias_field(value, "milestone_number", "number", settings);
}
