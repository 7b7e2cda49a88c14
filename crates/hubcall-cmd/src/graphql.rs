//! GraphQL commands (`hubcall graphql`).

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hubcall_api::{ApiError, GraphQLRequest, Invoker};
use hubcall_core::cmdutil::{AuthError, FlagError};
use serde::Deserialize;
use serde_json::Value;

use crate::factory::Factory;

const VIEWER_QUERY: &str = "query { viewer { login } }";

/// Run GraphQL documents.
#[derive(Debug, Subcommand)]
pub enum GraphqlCommand {
    /// Execute a query or mutation and print its `data`.
    Query(QueryArgs),
    /// Print the login of the authenticated user.
    Viewer,
}

impl GraphqlCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        match self {
            Self::Query(args) => args.run(factory).await,
            Self::Viewer => {
                let invoker = factory.invoker()?;
                if invoker.settings().access_token().is_none() {
                    return Err(AuthError(
                        "no token configured; pass --token or run `hubcall config set access_token TOKEN`"
                            .to_string(),
                    )
                    .into());
                }
                let login = viewer(&invoker)
                    .await
                    .context("failed to resolve the authenticated user")?;
                factory.io.println(&login)?;
                Ok(())
            }
        }
    }
}

/// Execute a GraphQL document.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// The document, or `@FILE` to read it from a file.
    #[arg(value_name = "QUERY")]
    query: String,

    /// Add a typed variable in key=value format (with JSON value coercion).
    #[arg(short = 'F', long)]
    field: Vec<String>,

    /// Add a string variable in key=value format.
    #[arg(short = 'f', long = "raw-field")]
    raw_field: Vec<String>,
}

impl QueryArgs {
    fn request(&self) -> Result<GraphQLRequest> {
        let query = match self.query.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read query file: {path}"))?,
            None => self.query.clone(),
        };

        let mut req = GraphQLRequest::new(query)
            .with_description("hubcall graphql query")
            .with_telemetry_event("InvokeGitHubGraphQl");
        for field in &self.field {
            let (key, value) = split_variable(field)?;
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
            req = req.with_variable(key, value);
        }
        for field in &self.raw_field {
            let (key, value) = split_variable(field)?;
            req = req.with_variable(key, Value::String(value.to_string()));
        }
        req.validate()?;
        Ok(req)
    }

    /// Run the graphql query command.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be read or the call fails.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let req = self.request()?;
        let invoker = factory.invoker()?;
        let data = invoker.graphql(&req).await.context("GraphQL query failed")?;
        factory.io.print_json(&data)
    }
}

fn split_variable(field: &str) -> Result<(&str, &str), FlagError> {
    field
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| FlagError(format!("variable {field:?} is not in key=value format")))
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    login: String,
}

/// Login of the user the token belongs to.
///
/// # Errors
///
/// Returns the invoker's error, or [`ApiError::InvalidData`] if the response
/// lacks a login.
pub async fn viewer(invoker: &Invoker) -> Result<String, ApiError> {
    let req = GraphQLRequest::new(VIEWER_QUERY)
        .with_description("Resolving authenticated user")
        .with_telemetry_event("GetGitHubViewer");
    let data: ViewerData = invoker.graphql_as(&req).await?;
    Ok(data.viewer.login)
}
