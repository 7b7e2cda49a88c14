//! `hubcall issue view` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// View an issue.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Issue number.
    #[arg(value_name = "NUMBER")]
    number: u64,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,
}

/// Fetch issue `number` of `repo`.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn get_issue(invoker: &Invoker, repo: &RepoRef, number: u64) -> Result<Value, ApiError> {
    let req = repo.tag(
        RequestDescriptor::get(format!("{}/issues/{number}", repo.api_path()))
            .with_telemetry_event("GetGitHubIssue"),
    );
    let mut issue = invoker.invoke(&req).await?;
    super::decorate_issues(&mut issue, repo, invoker.settings());
    Ok(issue)
}

impl ViewArgs {
    /// Run the issue view command.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let issue = get_issue(&invoker, &repo, self.number)
            .await
            .with_context(|| format!("failed to get issue #{}", self.number))?;
        factory.io.print_json(&issue)
    }
}
