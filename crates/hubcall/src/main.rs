//! hubcall - call the GitHub REST and GraphQL APIs from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hubcall_api::{ApiError, ErrorCategory};
use hubcall_cmd::factory::Factory;
use hubcall_cmd::repo_ref::RepoParseError;
use hubcall_core::cmdutil::{AuthError, FlagError};

/// Process exit codes.
mod exit_codes {
    pub const OK: i32 = 0;
    pub const ERROR: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 4;
}

/// Environment variable holding the log filter.
const DEBUG_ENV: &str = "HUBCALL_DEBUG";

/// Printed after a failure caused by an exhausted API quota.
const RATE_LIMIT_HINT: &str =
    "GitHub API rate limit exceeded; wait for the quota to reset or authenticate with a token";

/// Work with GitHub labels, milestones, issues and more from the command line.
#[derive(Debug, Parser)]
#[command(name = "hubcall", version, about)]
struct Cli {
    /// GitHub host to talk to (overrides `api_host_name`).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Access token to use ahead of the environment and the stored token.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Request timeout in seconds (0 disables it).
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Log requests and pages at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Make an authenticated GitHub API request.
    Api(hubcall_cmd::api::ApiArgs),
    /// Read branches.
    #[command(subcommand)]
    Branch(hubcall_cmd::branch::BranchCommand),
    /// Manage configuration for hubcall.
    #[command(subcommand)]
    Config(hubcall_cmd::config::ConfigCommand),
    /// Manage deployment environments.
    #[command(subcommand)]
    Environment(hubcall_cmd::environment::EnvironmentCommand),
    /// Read issue events.
    #[command(subcommand)]
    Event(hubcall_cmd::event::EventCommand),
    /// Run GraphQL documents.
    #[command(subcommand)]
    Graphql(hubcall_cmd::graphql::GraphqlCommand),
    /// Read issues.
    #[command(subcommand)]
    Issue(hubcall_cmd::issue::IssueCommand),
    /// Manage labels.
    #[command(subcommand)]
    Label(hubcall_cmd::label::LabelCommand),
    /// Manage milestones.
    #[command(subcommand)]
    Milestone(hubcall_cmd::milestone::MilestoneCommand),
    /// Move classic project columns and cards.
    #[command(subcommand)]
    Project(hubcall_cmd::project::ProjectCommand),
    /// Read organization teams and memberships.
    #[command(subcommand)]
    Team(hubcall_cmd::team::TeamCommand),
    /// Read repository traffic.
    #[command(subcommand)]
    Traffic(hubcall_cmd::traffic::TrafficCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(DEBUG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let factory = Factory::new(env!("CARGO_PKG_VERSION"))
        .with_host(cli.host)
        .with_token(cli.token)
        .with_timeout(cli.timeout);

    let exit_code = if let Some(cmd) = cli.command {
        match run_command(cmd, &factory).await {
            Ok(()) => exit_codes::OK,
            Err(e) => {
                tracing::error!("{e:#}");
                if let Some(hint) = hint_for(&e) {
                    tracing::warn!("{hint}");
                }
                exit_code_for(&e)
            }
        }
    } else {
        use clap::CommandFactory;
        Cli::command().print_help().ok();
        println!();
        exit_codes::OK
    };

    std::process::exit(exit_code);
}

/// Map a command failure to the process exit code.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<FlagError>().is_some() || err.downcast_ref::<RepoParseError>().is_some() {
        return exit_codes::USAGE;
    }
    if err.downcast_ref::<AuthError>().is_some() {
        return exit_codes::AUTH;
    }
    match err.downcast_ref::<ApiError>() {
        Some(api) if api.is_unauthorized() => exit_codes::AUTH,
        Some(api) if api.category() == ErrorCategory::InvalidArgument => exit_codes::USAGE,
        _ => exit_codes::ERROR,
    }
}

/// Advice to show alongside a command failure, if any applies.
fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<ApiError>()
        .filter(|api| api.is_rate_limited())
        .map(|_| RATE_LIMIT_HINT)
}

async fn run_command(cmd: Commands, factory: &Factory) -> anyhow::Result<()> {
    match cmd {
        Commands::Api(args) => args.run(factory).await,
        Commands::Branch(sub) => sub.run(factory).await,
        Commands::Config(sub) => sub.run(factory),
        Commands::Environment(sub) => sub.run(factory).await,
        Commands::Event(sub) => sub.run(factory).await,
        Commands::Graphql(sub) => sub.run(factory).await,
        Commands::Issue(sub) => sub.run(factory).await,
        Commands::Label(sub) => sub.run(factory).await,
        Commands::Milestone(sub) => sub.run(factory).await,
        Commands::Project(sub) => sub.run(factory).await,
        Commands::Team(sub) => sub.run(factory).await,
        Commands::Traffic(sub) => sub.run(factory).await,
    }
}
