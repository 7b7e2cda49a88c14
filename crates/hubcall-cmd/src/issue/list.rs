//! `hubcall issue list` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// List issues in a repository.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Filter by state.
    #[arg(short, long, value_parser = ["open", "closed", "all"], default_value = "open")]
    state: String,

    /// Filter by label (repeatable).
    #[arg(short, long)]
    label: Vec<String>,

    /// Keep pull requests, which the issues endpoint also returns.
    #[arg(long)]
    include_pull_requests: bool,
}

/// Options for [`list_issues`].
#[derive(Debug, Clone)]
pub struct ListIssuesOptions {
    /// Repository to read.
    pub repo: RepoRef,
    /// `open`, `closed` or `all`.
    pub state: String,
    /// Labels that every issue must carry.
    pub labels: Vec<String>,
    /// Keep entries that are pull requests.
    pub include_pull_requests: bool,
}

/// Fetch every issue matching the filters.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn list_issues(invoker: &Invoker, opts: &ListIssuesOptions) -> Result<Value, ApiError> {
    let mut fragment = format!(
        "{}/issues?state={}&per_page=100",
        opts.repo.api_path(),
        urlencoding::encode(&opts.state)
    );
    if !opts.labels.is_empty() {
        fragment.push_str("&labels=");
        fragment.push_str(&urlencoding::encode(&opts.labels.join(",")));
    }

    let req = opts
        .repo
        .tag(RequestDescriptor::get(fragment).with_telemetry_event("GetGitHubIssue"));
    let mut issues: Vec<Value> = invoker.invoke_multipage(&req).await?;
    if !opts.include_pull_requests {
        issues.retain(|issue| issue.get("pull_request").is_none());
    }

    let mut issues = Value::Array(issues);
    super::decorate_issues(&mut issues, &opts.repo, invoker.settings());
    Ok(issues)
}

impl ListArgs {
    /// Run the issue list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the issues cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = ListIssuesOptions {
            repo,
            state: self.state.clone(),
            labels: self.label.clone(),
            include_pull_requests: self.include_pull_requests,
        };
        let issues = list_issues(&invoker, &opts)
            .await
            .context("failed to list issues")?;
        factory.io.print_json(&issues)
    }
}
