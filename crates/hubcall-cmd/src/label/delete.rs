//! `hubcall label delete` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Delete a label.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Label name.
    #[arg(value_name = "NAME")]
    name: String,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,
}

/// Options for [`delete_label`].
#[derive(Debug, Clone)]
pub struct DeleteLabelOptions {
    /// Repository holding the label.
    pub repo: RepoRef,
    /// Label name.
    pub name: String,
}

/// Delete a label.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn delete_label(invoker: &Invoker, opts: &DeleteLabelOptions) -> Result<(), ApiError> {
    let req = super::request(
        &opts.repo,
        RequestDescriptor::delete(super::label_path(&opts.repo, &opts.name)),
        "RemoveGitHubLabel",
    );
    invoker.invoke(&req).await?;
    Ok(())
}

impl DeleteArgs {
    /// Run the label delete command.
    ///
    /// # Errors
    ///
    /// Returns an error if the label cannot be deleted.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = DeleteLabelOptions {
            repo: repo.clone(),
            name: self.name.clone(),
        };
        delete_label(&invoker, &opts)
            .await
            .with_context(|| format!("failed to delete label {:?}", self.name))?;
        factory
            .io
            .eprintln(&format!("Deleted label {:?} from {repo}", self.name))?;
        Ok(())
    }
}
