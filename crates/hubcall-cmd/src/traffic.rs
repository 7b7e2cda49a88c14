//! Repository traffic commands (`hubcall traffic`).
//!
//! Traffic data covers the last 14 days and needs push access.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::decorate;
use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Which traffic report to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficReport {
    /// Page views, bucketed per day or week.
    Views,
    /// Clones, bucketed per day or week.
    Clones,
    /// Top referring sites.
    Referrers,
    /// Most visited paths.
    Paths,
}

impl TrafficReport {
    fn fragment(self, repo: &RepoRef, per: Option<Bucket>) -> String {
        let base = repo.api_path();
        match self {
            Self::Views | Self::Clones => {
                let name = if self == Self::Views { "views" } else { "clones" };
                let per = per.unwrap_or_default();
                format!("{base}/traffic/{name}?per={}", per.as_str())
            }
            Self::Referrers => format!("{base}/traffic/popular/referrers"),
            Self::Paths => format!("{base}/traffic/popular/paths"),
        }
    }

    fn event_name(self) -> &'static str {
        match self {
            Self::Views => "GetGitHubViewTraffic",
            Self::Clones => "GetGitHubCloneTraffic",
            Self::Referrers => "GetGitHubReferrerTraffic",
            Self::Paths => "GetGitHubPathTraffic",
        }
    }
}

/// Time bucket for views and clones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Bucket {
    /// One entry per day.
    #[default]
    Day,
    /// One entry per week.
    Week,
}

impl Bucket {
    fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// Read repository traffic.
#[derive(Debug, Subcommand)]
pub enum TrafficCommand {
    /// Page views.
    Views(BucketArgs),
    /// Clones.
    Clones(BucketArgs),
    /// Top referring sites.
    Referrers(RepoArgs),
    /// Most visited paths.
    Paths(RepoArgs),
}

/// Arguments for bucketed reports.
#[derive(Debug, Args)]
pub struct BucketArgs {
    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Bucket size.
    #[arg(long, value_enum, default_value_t = Bucket::Day)]
    per: Bucket,
}

/// Arguments for reports that take only a repository.
#[derive(Debug, Args)]
pub struct RepoArgs {
    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,
}

/// Fetch a traffic report.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn get_traffic(
    invoker: &Invoker,
    repo: &RepoRef,
    report: TrafficReport,
    per: Option<Bucket>,
) -> Result<Value, ApiError> {
    let req = repo.tag(
        RequestDescriptor::get(report.fragment(repo, per)).with_telemetry_event(report.event_name()),
    );
    let mut traffic = invoker.invoke(&req).await?;
    let settings = invoker.settings();
    decorate::add_properties(
        &mut traffic,
        &[
            ("owner_name", Value::String(repo.owner().to_string())),
            ("repository_name", Value::String(repo.name().to_string())),
        ],
        settings,
    );
    Ok(traffic)
}

impl TrafficCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let (repo, report, per) = match self {
            Self::Views(args) => (&args.repo, TrafficReport::Views, Some(args.per)),
            Self::Clones(args) => (&args.repo, TrafficReport::Clones, Some(args.per)),
            Self::Referrers(args) => (&args.repo, TrafficReport::Referrers, None),
            Self::Paths(args) => (&args.repo, TrafficReport::Paths, None),
        };
        let repo = RepoRef::resolve(repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let traffic = get_traffic(&invoker, &repo, report, per)
            .await
            .with_context(|| format!("failed to fetch traffic for {repo}"))?;
        factory.io.print_json(&traffic)
    }
}
