//! `hubcall milestone list` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// List milestones.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Filter by state.
    #[arg(short, long, value_parser = ["open", "closed", "all"], default_value = "open")]
    state: String,

    /// Sort field.
    #[arg(long, value_parser = ["due_on", "completeness"], default_value = "due_on")]
    sort: String,

    /// Sort direction.
    #[arg(long, value_parser = ["asc", "desc"], default_value = "asc")]
    direction: String,
}

/// Options for [`list_milestones`].
#[derive(Debug, Clone)]
pub struct ListMilestonesOptions {
    /// Repository to read.
    pub repo: RepoRef,
    /// `open`, `closed` or `all`.
    pub state: String,
    /// `due_on` or `completeness`.
    pub sort: String,
    /// `asc` or `desc`.
    pub direction: String,
}

/// Fetch every milestone matching the filters.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn list_milestones(
    invoker: &Invoker,
    opts: &ListMilestonesOptions,
) -> Result<Value, ApiError> {
    let fragment = format!(
        "{}/milestones?state={}&sort={}&direction={}&per_page=100",
        opts.repo.api_path(),
        urlencoding::encode(&opts.state),
        urlencoding::encode(&opts.sort),
        urlencoding::encode(&opts.direction),
    );
    let req = opts
        .repo
        .tag(RequestDescriptor::get(fragment).with_telemetry_event("GetGitHubMilestone"));
    let mut milestones = Value::Array(invoker.invoke_multipage(&req).await?);
    super::decorate_milestones(&mut milestones, &opts.repo, invoker.settings());
    Ok(milestones)
}

impl ListArgs {
    /// Run the milestone list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the milestones cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = ListMilestonesOptions {
            repo,
            state: self.state.clone(),
            sort: self.sort.clone(),
            direction: self.direction.clone(),
        };
        let milestones = list_milestones(&invoker, &opts)
            .await
            .context("failed to list milestones")?;
        factory.io.print_json(&milestones)
    }
}
