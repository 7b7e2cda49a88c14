//! `hubcall label list` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// List labels.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,
}

/// Options for [`list_labels`].
#[derive(Debug, Clone)]
pub struct ListLabelsOptions {
    /// Repository to read.
    pub repo: RepoRef,
}

/// Fetch every label of a repository.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn list_labels(invoker: &Invoker, opts: &ListLabelsOptions) -> Result<Value, ApiError> {
    let req = super::request(
        &opts.repo,
        RequestDescriptor::get(format!("{}/labels?per_page=100", opts.repo.api_path())),
        "GetGitHubLabel",
    );
    let mut labels = Value::Array(invoker.invoke_multipage(&req).await?);
    super::decorate_labels(&mut labels, &opts.repo, invoker.settings());
    Ok(labels)
}

impl ListArgs {
    /// Run the label list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the labels cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let labels = list_labels(&invoker, &ListLabelsOptions { repo: repo.clone() })
            .await
            .with_context(|| format!("failed to list labels of {repo}"))?;
        factory.io.print_json(&labels)
    }
}
