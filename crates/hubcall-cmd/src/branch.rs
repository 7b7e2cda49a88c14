//! Branch commands (`hubcall branch`).

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::decorate;
use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Read branches.
#[derive(Debug, Subcommand)]
pub enum BranchCommand {
    /// List branches.
    #[command(alias = "ls")]
    List(ListArgs),
}

impl BranchCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        match self {
            Self::List(args) => args.run(factory).await,
        }
    }
}

/// List branches.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Only protected (`true`) or only unprotected (`false`) branches.
    #[arg(long)]
    protected: Option<bool>,
}

/// Options for [`list_branches`].
#[derive(Debug, Clone)]
pub struct ListBranchesOptions {
    /// Repository to read.
    pub repo: RepoRef,
    /// Protection filter; `None` returns all branches.
    pub protected: Option<bool>,
}

/// Fetch every branch of a repository.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn list_branches(invoker: &Invoker, opts: &ListBranchesOptions) -> Result<Value, ApiError> {
    let mut fragment = format!("{}/branches?per_page=100", opts.repo.api_path());
    if let Some(protected) = opts.protected {
        fragment.push_str(&format!("&protected={protected}"));
    }
    let req = opts
        .repo
        .tag(RequestDescriptor::get(fragment).with_telemetry_event("GetGitHubBranch"));

    let mut branches = Value::Array(invoker.invoke_multipage(&req).await?);
    let settings = invoker.settings();
    decorate::add_properties(
        &mut branches,
        &[(
            "repository_url",
            Value::String(opts.repo.html_url(&settings.api_host_name)),
        )],
        settings,
    );
    decorate::alias_field(&mut branches, "branch_name", "name", settings);
    Ok(branches)
}

impl ListArgs {
    /// Run the branch list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the branches cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = ListBranchesOptions {
            repo,
            protected: self.protected,
        };
        let branches = list_branches(&invoker, &opts)
            .await
            .context("failed to list branches")?;
        factory.io.print_json(&branches)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::test_helpers::TestHarness;

    #[tokio::test]
    async fn test_should_filter_protected_branches() {
        let h = TestHarness::new().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/branches"))
            .and(query_param("protected", "true"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"name": "main", "protected": true}])),
            )
            .expect(1)
            .mount(&h.server)
            .await;

        let args = ListArgs {
            repo: None,
            protected: Some(true),
        };
        args.run(&h.factory).await.unwrap();
        let out = h.stdout_json();
        assert_eq!(out[0]["branch_name"], "main");
    }

    #[tokio::test]
    async fn test_should_skip_decoration_when_disabled() {
        let mut settings = hubcall_core::Settings::default();
        settings.disable_pipeline_support = true;
        let h = TestHarness::with_settings(settings).await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/branches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "main"}])))
            .mount(&h.server)
            .await;

        let invoker = h.factory.invoker().unwrap();
        let branches = list_branches(
            &invoker,
            &ListBranchesOptions {
                repo: RepoRef::new("o", "r"),
                protected: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(branches, json!([{"name": "main"}]));
    }
}
