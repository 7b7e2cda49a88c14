//! `hubcall label view` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Show one label.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Label name.
    #[arg(value_name = "NAME")]
    name: String,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,
}

/// Options for [`get_label`].
#[derive(Debug, Clone)]
pub struct GetLabelOptions {
    /// Repository holding the label.
    pub repo: RepoRef,
    /// Label name.
    pub name: String,
}

/// Fetch a single label by name.
///
/// # Errors
///
/// Returns the invoker's error; a missing label is classified `NotFound`.
pub async fn get_label(invoker: &Invoker, opts: &GetLabelOptions) -> Result<Value, ApiError> {
    let req = super::request(
        &opts.repo,
        RequestDescriptor::get(super::label_path(&opts.repo, &opts.name)),
        "GetGitHubLabel",
    );
    let mut label = invoker.invoke(&req).await?;
    super::decorate_labels(&mut label, &opts.repo, invoker.settings());
    Ok(label)
}

impl ViewArgs {
    /// Run the label view command.
    ///
    /// # Errors
    ///
    /// Returns an error if the label cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = GetLabelOptions {
            repo,
            name: self.name.clone(),
        };
        let label = get_label(&invoker, &opts)
            .await
            .with_context(|| format!("failed to get label {:?}", self.name))?;
        factory.io.print_json(&label)
    }
}
