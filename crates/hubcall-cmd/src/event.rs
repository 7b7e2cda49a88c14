//! Issue event commands (`hubcall event`).
//!
//! Events are fetched with the preview media types that expose project card
//! moves and lock reasons.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::decorate;
use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Previews requested for issue events.
pub const EVENT_PREVIEWS: &[&str] = &["starfox", "sailor-v"];

/// Build an `Accept` header from preview names, comma-joined.
pub fn preview_accept(previews: &[&str]) -> String {
    previews
        .iter()
        .map(|name| format!("application/vnd.github.{name}-preview+json"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Read issue events.
#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// List issue events for a repository or a single issue.
    #[command(alias = "ls")]
    List(ListArgs),
}

impl EventCommand {
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

/// List issue events.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Only events of this issue.
    #[arg(long, value_name = "NUMBER")]
    issue: Option<u64>,
}

/// Fetch every issue event of `repo`, or of one issue.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn list_events(invoker: &Invoker, repo: &RepoRef, issue: Option<u64>) -> Result<Value, ApiError> {
    let fragment = match issue {
        Some(number) => format!("{}/issues/{number}/events?per_page=100", repo.api_path()),
        None => format!("{}/issues/events?per_page=100", repo.api_path()),
    };
    let req = repo.tag(
        RequestDescriptor::get(fragment)
            .with_accept(preview_accept(EVENT_PREVIEWS))
            .with_telemetry_event("GetGitHubEvent"),
    );

    let mut events = Value::Array(invoker.invoke_multipage(&req).await?);
    let settings = invoker.settings();
    decorate::add_properties(
        &mut events,
        &[(
            "repository_url",
            Value::String(repo.html_url(&settings.api_host_name)),
        )],
        settings,
    );
    decorate::alias_field(&mut events, "event_id", "id", settings);
    Ok(events)
}

impl ListArgs {
    /// Run the event list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the events cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let events = list_events(&invoker, &repo, self.issue)
            .await
            .context("failed to list issue events")?;
        factory.io.print_json(&events)
    }
}
