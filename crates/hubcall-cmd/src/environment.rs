//! Deployment environment commands (`hubcall environment`).

use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::{Map, Value, json};

use crate::decorate;
use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Longest wait timer GitHub accepts, in minutes (30 days).
pub const MAX_WAIT_TIMER: u32 = 43_200;

/// Most required reviewers an environment may have.
pub const MAX_REVIEWERS: usize = 6;

/// Manage deployment environments.
#[derive(Debug, Subcommand)]
pub enum EnvironmentCommand {
    /// Create or update an environment.
    Set(SetArgs),
    /// Show an environment.
    View(NameArgs),
    /// Delete an environment.
    Delete(NameArgs),
}

impl EnvironmentCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        match self {
            Self::Set(args) => args.run(factory).await,
            Self::View(args) => args.run_view(factory).await,
            Self::Delete(args) => args.run_delete(factory).await,
        }
    }
}

/// A required reviewer: `user:<id>` or `team:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reviewer {
    /// A user by numeric id.
    User(u64),
    /// A team by numeric id.
    Team(u64),
}

impl Reviewer {
    fn to_json(self) -> Value {
        match self {
            Self::User(id) => json!({"type": "User", "id": id}),
            Self::Team(id) => json!({"type": "Team", "id": id}),
        }
    }
}

impl FromStr for Reviewer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("expected user:<id> or team:<id>, got {s:?}"))?;
        let id: u64 = id
            .trim()
            .parse()
            .map_err(|_| format!("reviewer id must be numeric, got {id:?}"))?;
        match kind.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User(id)),
            "team" => Ok(Self::Team(id)),
            other => Err(format!("unknown reviewer type {other:?}")),
        }
    }
}

/// Create or update an environment.
#[derive(Debug, Args)]
pub struct SetArgs {
    /// Environment name.
    #[arg(value_name = "NAME")]
    name: String,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Minutes to wait before a deployment may proceed.
    #[arg(long)]
    wait_timer: Option<u32>,

    /// Required reviewer, `user:<id>` or `team:<id>` (repeatable).
    #[arg(long = "reviewer")]
    reviewers: Vec<Reviewer>,

    /// Only protected branches may deploy.
    #[arg(long)]
    protected_branches: bool,
}

/// An environment name plus repository.
#[derive(Debug, Args)]
pub struct NameArgs {
    /// Environment name.
    #[arg(value_name = "NAME")]
    name: String,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,
}

/// Options for [`set_environment`].
#[derive(Debug, Clone, Default)]
pub struct SetEnvironmentOptions {
    /// Wait timer in minutes.
    pub wait_timer: Option<u32>,
    /// Required reviewers.
    pub reviewers: Vec<Reviewer>,
    /// Restrict deployments to protected branches.
    pub protected_branches: bool,
}

impl SetEnvironmentOptions {
    /// The request body, after checking GitHub's limits.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range wait timer or too many
    /// reviewers.
    pub fn body(&self) -> Result<Option<Value>, ApiError> {
        let mut body = Map::new();
        if let Some(wait_timer) = self.wait_timer {
            if wait_timer > MAX_WAIT_TIMER {
                return Err(ApiError::Validation(format!(
                    "wait timer must be at most {MAX_WAIT_TIMER} minutes, got {wait_timer}"
                )));
            }
            body.insert("wait_timer".to_string(), json!(wait_timer));
        }
        if !self.reviewers.is_empty() {
            if self.reviewers.len() > MAX_REVIEWERS {
                return Err(ApiError::Validation(format!(
                    "at most {MAX_REVIEWERS} reviewers are allowed, got {}",
                    self.reviewers.len()
                )));
            }
            let reviewers = self.reviewers.iter().map(|r| r.to_json()).collect();
            body.insert("reviewers".to_string(), Value::Array(reviewers));
        }
        if self.protected_branches {
            body.insert(
                "deployment_branch_policy".to_string(),
                json!({"protected_branches": true, "custom_branch_policies": false}),
            );
        }
        Ok((!body.is_empty()).then_some(Value::Object(body)))
    }
}

fn environment_path(repo: &RepoRef, name: &str) -> String {
    format!("{}/environments/{}", repo.api_path(), urlencoding::encode(name))
}

fn decorate_environment(value: &mut Value, repo: &RepoRef, invoker: &Invoker) {
    let settings = invoker.settings();
    decorate::add_properties(
        value,
        &[(
            "repository_url",
            Value::String(repo.html_url(&settings.api_host_name)),
        )],
        settings,
    );
    decorate::alias_field(value, "environment_name", "name", settings);
}

/// Create or update environment `name`.
///
/// # Errors
///
/// Returns a validation error for out-of-range options, otherwise the
/// invoker's error.
pub async fn set_environment(
    invoker: &Invoker,
    repo: &RepoRef,
    name: &str,
    opts: &SetEnvironmentOptions,
) -> Result<Value, ApiError> {
    let mut req = RequestDescriptor::put(environment_path(repo, name))
        .with_telemetry_event("SetGitHubDeploymentEnvironment");
    if let Some(body) = opts.body()? {
        req = req.with_body(body);
    }
    let mut environment = invoker.invoke(&repo.tag(req)).await?;
    decorate_environment(&mut environment, repo, invoker);
    Ok(environment)
}

/// Fetch environment `name`.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn get_environment(invoker: &Invoker, repo: &RepoRef, name: &str) -> Result<Value, ApiError> {
    let req = repo.tag(
        RequestDescriptor::get(environment_path(repo, name))
            .with_telemetry_event("GetGitHubDeploymentEnvironment"),
    );
    let mut environment = invoker.invoke(&req).await?;
    decorate_environment(&mut environment, repo, invoker);
    Ok(environment)
}

/// Delete environment `name`.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn delete_environment(invoker: &Invoker, repo: &RepoRef, name: &str) -> Result<(), ApiError> {
    let req = repo.tag(
        RequestDescriptor::delete(environment_path(repo, name))
            .with_telemetry_event("RemoveGitHubDeploymentEnvironment"),
    );
    invoker.invoke(&req).await?;
    Ok(())
}

impl SetArgs {
    /// Run the environment set command.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be written.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = SetEnvironmentOptions {
            wait_timer: self.wait_timer,
            reviewers: self.reviewers.clone(),
            protected_branches: self.protected_branches,
        };
        let environment = set_environment(&invoker, &repo, &self.name, &opts)
            .await
            .with_context(|| format!("failed to set environment {:?}", self.name))?;
        factory.io.print_json(&environment)
    }
}

impl NameArgs {
    async fn run_view(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let environment = get_environment(&invoker, &repo, &self.name)
            .await
            .with_context(|| format!("failed to get environment {:?}", self.name))?;
        factory.io.print_json(&environment)
    }

    async fn run_delete(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        delete_environment(&invoker, &repo, &self.name)
            .await
            .with_context(|| format!("failed to delete environment {:?}", self.name))?;
        factory
            .io
            .eprintln(&format!("Deleted environment {:?} from {repo}", self.name))?;
        Ok(())
    }
}
