//! `hubcall label create` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Create a label.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Label name.
    #[arg(value_name = "NAME")]
    name: String,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Label color (hex, `#` optional).
    #[arg(short, long, default_value = "ededed")]
    color: String,

    /// Label description.
    #[arg(short, long)]
    description: Option<String>,
}

/// Options for [`create_label`].
#[derive(Debug, Clone)]
pub struct CreateLabelOptions {
    /// Repository to add the label to.
    pub repo: RepoRef,
    /// Label name.
    pub name: String,
    /// Hex color.
    pub color: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Create a label.
///
/// # Errors
///
/// Returns a validation error for a malformed color, otherwise the
/// invoker's error (422 when the label already exists).
pub async fn create_label(invoker: &Invoker, opts: &CreateLabelOptions) -> Result<Value, ApiError> {
    let mut body = serde_json::json!({
        "name": opts.name,
        "color": super::normalize_color(&opts.color)?,
    });
    if let Some(ref desc) = opts.description {
        body["description"] = Value::String(desc.clone());
    }

    let req = super::request(
        &opts.repo,
        RequestDescriptor::post(format!("{}/labels", opts.repo.api_path()), body),
        "NewGitHubLabel",
    );
    let mut label = invoker.invoke(&req).await?;
    super::decorate_labels(&mut label, &opts.repo, invoker.settings());
    Ok(label)
}

impl CreateArgs {
    /// Run the label create command.
    ///
    /// # Errors
    ///
    /// Returns an error if the label cannot be created.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = CreateLabelOptions {
            repo,
            name: self.name.clone(),
            color: self.color.clone(),
            description: self.description.clone(),
        };
        let label = create_label(&invoker, &opts)
            .await
            .context("failed to create label")?;
        factory.io.print_json(&label)
    }
}
