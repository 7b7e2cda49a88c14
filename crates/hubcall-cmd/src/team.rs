//! Team commands (`hubcall team`).

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::{Value, json};

use crate::decorate;
use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Read organization teams.
#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// List the teams of an organization.
    #[command(alias = "ls")]
    List(ListArgs),
    /// Check whether a user belongs to a team.
    Member(MemberArgs),
}

impl TeamCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        match self {
            Self::List(args) => args.run(factory).await,
            Self::Member(args) => args.run(factory).await,
        }
    }
}

/// List the teams of an organization.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Organization; defaults to the configured owner.
    #[arg(long)]
    org: Option<String>,
}

/// Check whether a user belongs to a team.
#[derive(Debug, Args)]
pub struct MemberArgs {
    /// Team slug.
    #[arg(value_name = "TEAM")]
    team: String,

    /// User login.
    #[arg(value_name = "USER")]
    user: String,

    /// Organization; defaults to the configured owner.
    #[arg(long)]
    org: Option<String>,
}

/// Fetch every team of `org`.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn list_teams(invoker: &Invoker, org: &str) -> Result<Value, ApiError> {
    let req = RequestDescriptor::get(format!(
        "orgs/{}/teams?per_page=100",
        urlencoding::encode(org)
    ))
    .with_telemetry_event("GetGitHubTeam")
    .with_telemetry_property("OrganizationName", org);

    let mut teams = Value::Array(invoker.invoke_multipage(&req).await?);
    let settings = invoker.settings();
    decorate::add_properties(
        &mut teams,
        &[("organization_name", Value::String(org.to_string()))],
        settings,
    );
    decorate::alias_field(&mut teams, "team_slug", "slug", settings);
    Ok(teams)
}

/// Membership of a user in a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMembership {
    /// Whether the user is a member (active or pending).
    pub member: bool,
    /// `active` or `pending` for members.
    pub state: Option<String>,
    /// `member` or `maintainer` for members.
    pub role: Option<String>,
}

/// Test whether `user` belongs to `team` in `org`.
///
/// A 200 or 204 response means member and a 404 means not a member. Every
/// other failure propagates.
///
/// # Errors
///
/// Returns the invoker's error for anything but 404.
pub async fn check_membership(
    invoker: &Invoker,
    org: &str,
    team: &str,
    user: &str,
) -> Result<TeamMembership, ApiError> {
    let req = RequestDescriptor::get(format!(
        "orgs/{}/teams/{}/memberships/{}",
        urlencoding::encode(org),
        urlencoding::encode(team),
        urlencoding::encode(user)
    ))
    .extended()
    .with_telemetry_event("TestGitHubTeamMember")
    .with_telemetry_property("OrganizationName", org)
    .with_exception_bucket("TestGitHubTeamMember-NotMember");

    match invoker.invoke(&req).await {
        Ok(extended) => {
            let member = matches!(extended["statusCode"].as_u64(), Some(200 | 204));
            let field = |name: &str| extended["result"][name].as_str().map(str::to_string);
            Ok(TeamMembership {
                member,
                state: field("state"),
                role: field("role"),
            })
        }
        Err(err) if err.status() == Some(404) => Ok(TeamMembership {
            member: false,
            state: None,
            role: None,
        }),
        Err(err) => Err(err),
    }
}

impl ListArgs {
    /// Run the team list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the teams cannot be fetched.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let org = RepoRef::resolve_owner(self.org.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let teams = list_teams(&invoker, &org)
            .await
            .with_context(|| format!("failed to list teams of {org}"))?;
        factory.io.print_json(&teams)
    }
}

impl MemberArgs {
    /// Run the team member command.
    ///
    /// # Errors
    ///
    /// Returns an error if membership cannot be determined.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let org = RepoRef::resolve_owner(self.org.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let membership = check_membership(&invoker, &org, &self.team, &self.user)
            .await
            .with_context(|| format!("failed to check membership of {} in {org}/{}", self.user, self.team))?;
        factory.io.print_json(&json!({
            "organization_name": org,
            "team_slug": self.team,
            "user": self.user,
            "member": membership.member,
            "state": membership.state,
            "role": membership.role,
        }))
    }
}
