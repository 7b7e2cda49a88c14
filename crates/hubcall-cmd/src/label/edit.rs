//! `hubcall label edit` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::{Map, Value};

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Edit a label.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Current label name.
    #[arg(value_name = "NAME")]
    name: String,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// New label name.
    #[arg(short = 'n', long)]
    new_name: Option<String>,

    /// New label color.
    #[arg(short, long)]
    color: Option<String>,

    /// New label description.
    #[arg(short, long)]
    description: Option<String>,
}

/// Options for [`update_label`].
#[derive(Debug, Clone)]
pub struct UpdateLabelOptions {
    /// Repository holding the label.
    pub repo: RepoRef,
    /// Current name.
    pub name: String,
    /// Rename to this.
    pub new_name: Option<String>,
    /// New color.
    pub color: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Update a label's name, color or description.
///
/// # Errors
///
/// Returns a validation error when nothing would change or the color is
/// malformed, otherwise the invoker's error.
pub async fn update_label(invoker: &Invoker, opts: &UpdateLabelOptions) -> Result<Value, ApiError> {
    let mut body = Map::new();
    if let Some(ref new_name) = opts.new_name {
        body.insert("new_name".to_string(), Value::String(new_name.clone()));
    }
    if let Some(ref color) = opts.color {
        body.insert("color".to_string(), Value::String(super::normalize_color(color)?));
    }
    if let Some(ref desc) = opts.description {
        body.insert("description".to_string(), Value::String(desc.clone()));
    }
    if body.is_empty() {
        return Err(ApiError::Validation(
            "specify at least one of --new-name, --color or --description".to_string(),
        ));
    }

    let req = super::request(
        &opts.repo,
        RequestDescriptor::patch(super::label_path(&opts.repo, &opts.name), Value::Object(body)),
        "SetGitHubLabel",
    );
    let mut label = invoker.invoke(&req).await?;
    super::decorate_labels(&mut label, &opts.repo, invoker.settings());
    Ok(label)
}

impl EditArgs {
    /// Run the label edit command.
    ///
    /// # Errors
    ///
    /// Returns an error if the label cannot be updated.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = UpdateLabelOptions {
            repo,
            name: self.name.clone(),
            new_name: self.new_name.clone(),
            color: self.color.clone(),
            description: self.description.clone(),
        };
        let label = update_label(&invoker, &opts)
            .await
            .with_context(|| format!("failed to update label {:?}", self.name))?;
        factory.io.print_json(&label)
    }
}
