//! `hubcall milestone delete` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Delete a milestone.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Milestone number.
    #[arg(value_name = "NUMBER")]
    number: u64,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,
}

/// Delete milestone `number` from `repo`.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn delete_milestone(invoker: &Invoker, repo: &RepoRef, number: u64) -> Result<(), ApiError> {
    let req = repo.tag(
        RequestDescriptor::delete(format!("{}/milestones/{number}", repo.api_path()))
            .with_telemetry_event("RemoveGitHubMilestone"),
    );
    invoker.invoke(&req).await?;
    Ok(())
}

impl DeleteArgs {
    /// Run the milestone delete command.
    ///
    /// # Errors
    ///
    /// Returns an error if the milestone cannot be deleted.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        delete_milestone(&invoker, &repo, self.number)
            .await
            .with_context(|| format!("failed to delete milestone #{}", self.number))?;
        factory
            .io
            .eprintln(&format!("Deleted milestone #{} from {repo}", self.number))?;
        Ok(())
    }
}
