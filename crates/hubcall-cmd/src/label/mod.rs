//! Label commands (`hubcall label`).
//!
//! Manage labels in a GitHub repository.

pub mod create;
pub mod delete;
pub mod edit;
pub mod list;
pub mod view;

use clap::Subcommand;
use hubcall_api::RequestDescriptor;
use hubcall_core::Settings;
use serde_json::Value;

use crate::decorate;
use crate::repo_ref::RepoRef;

/// Media type that returns label descriptions.
pub const LABEL_ACCEPT: &str = "application/vnd.github.symmetra-preview+json";

/// Manage labels.
#[derive(Debug, Subcommand)]
pub enum LabelCommand {
    /// Create a label.
    Create(create::CreateArgs),
    /// Delete a label.
    Delete(delete::DeleteArgs),
    /// Edit a label.
    Edit(edit::EditArgs),
    /// List labels.
    #[command(alias = "ls")]
    List(list::ListArgs),
    /// Show one label.
    View(view::ViewArgs),
}

impl LabelCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &crate::factory::Factory) -> anyhow::Result<()> {
        match self {
            Self::Create(args) => args.run(factory).await,
            Self::Delete(args) => args.run(factory).await,
            Self::Edit(args) => args.run(factory).await,
            Self::List(args) => args.run(factory).await,
            Self::View(args) => args.run(factory).await,
        }
    }
}

fn label_path(repo: &RepoRef, name: &str) -> String {
    format!("{}/labels/{}", repo.api_path(), urlencoding::encode(name))
}

fn request(repo: &RepoRef, req: RequestDescriptor, event: &str) -> RequestDescriptor {
    repo.tag(req.with_accept(LABEL_ACCEPT).with_telemetry_event(event))
}

fn decorate_labels(value: &mut Value, repo: &RepoRef, settings: &Settings) {
    decorate::add_properties(
        value,
        &[(
            "repository_url",
            Value::String(repo.html_url(&settings.api_host_name)),
        )],
        settings,
    );
    decorate::alias_field(value, "label_name", "name", settings);
}

/// Strip a leading `#` and check for six hex digits.
fn normalize_color(color: &str) -> Result<String, hubcall_api::ApiError> {
    let color = color.trim().trim_start_matches('#');
    if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(hubcall_api::ApiError::Validation(format!(
            "invalid label color {color:?}: expected six hex digits"
        )))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("d73a4a", Some("d73a4a"))]
    #[case("#D73A4A", Some("d73a4a"))]
    #[case("red", None)]
    #[case("#12345", None)]
    fn test_should_normalize_color(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_color(input).ok().as_deref(), expected);
    }

    #[test]
    fn test_should_encode_label_name() {
        let repo = RepoRef::new("o", "r");
        assert_eq!(label_path(&repo, "good first issue"), "repos/o/r/labels/good%20first%20issue");
    }
}
