//! Raw API command (`hubcall api`).
//!
//! Sends an arbitrary REST request through the invoker, so authentication,
//! error interpretation and pagination behave as for every other command.

use std::io::Read;

use anyhow::Context;
use clap::Args;
use hubcall_api::{Invoker, Method, RequestDescriptor};
use hubcall_core::cmdutil::FlagError;
use serde_json::{Map, Value};

use crate::event::preview_accept;
use crate::factory::Factory;

/// Make an authenticated GitHub API request.
#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Endpoint path relative to the API root (e.g. `repos/OWNER/REPO/issues`).
    endpoint: String,

    /// HTTP method (defaults to GET, or POST when a body is given).
    #[arg(short = 'X', long)]
    method: Option<String>,

    /// Add a typed parameter in key=value format (with JSON value coercion).
    #[arg(short = 'F', long)]
    field: Vec<String>,

    /// Add a string parameter in key=value format (no JSON coercion).
    #[arg(short = 'f', long = "raw-field")]
    raw_field: Vec<String>,

    /// JSON file to send as the request body (`-` for stdin).
    #[arg(long)]
    input: Option<String>,

    /// Override the `Accept` header.
    #[arg(long)]
    accept: Option<String>,

    /// Opt into API previews (names should omit '-preview').
    #[arg(short, long)]
    preview: Vec<String>,

    /// Fetch all pages and print one combined array.
    #[arg(long)]
    paginate: bool,

    /// Print status code, request id, next link and headers with the result.
    #[arg(short, long)]
    include: bool,

    /// Do not print the response body.
    #[arg(long)]
    silent: bool,
}

impl ApiArgs {
    /// Run the api command.
    ///
    /// # Errors
    ///
    /// Returns an error if the flags conflict or the request fails.
    pub async fn run(&self, factory: &Factory) -> anyhow::Result<()> {
        let req = self.descriptor()?;
        let invoker = factory.invoker()?;
        let result = call(&invoker, &req, self.paginate)
            .await
            .with_context(|| format!("{} {} failed", req.method, req.uri_fragment))?;
        if self.silent {
            return Ok(());
        }
        factory.io.print_json(&result)
    }

    /// Build the request from the flags.
    fn descriptor(&self) -> anyhow::Result<RequestDescriptor> {
        self.validate_flags()?;
        let body = self.build_body()?;
        let method = match self.method {
            Some(ref m) => m.parse::<Method>()?,
            None if body.is_some() => Method::Post,
            None => Method::Get,
        };

        let mut endpoint = self.endpoint.trim_start_matches('/').to_string();
        if self.paginate && !endpoint.contains("per_page=") {
            let separator = if endpoint.contains('?') { '&' } else { '?' };
            endpoint = format!("{endpoint}{separator}per_page=100");
        }

        let mut req = RequestDescriptor::new(method, endpoint)
            .with_description(format!("hubcall api {}", self.endpoint));
        if let Some(body) = body {
            req = req.with_body(body);
        }
        if let Some(ref accept) = self.accept {
            req = req.with_accept(accept.clone());
        } else if !self.preview.is_empty() {
            let names: Vec<&str> = self.preview.iter().map(String::as_str).collect();
            req = req.with_accept(preview_accept(&names));
        }
        if self.include {
            req = req.extended();
        }
        req.validate()?;
        Ok(req)
    }

    fn validate_flags(&self) -> Result<(), FlagError> {
        if self.paginate {
            let method = self.method.as_deref().unwrap_or("GET");
            if !method.eq_ignore_ascii_case("GET") {
                return Err(FlagError(
                    "the `--paginate` option is not supported for non-GET requests".to_string(),
                ));
            }
            if self.include {
                return Err(FlagError(
                    "the `--paginate` option is not supported with `--include`".to_string(),
                ));
            }
        }
        if self.input.is_some() && !(self.field.is_empty() && self.raw_field.is_empty()) {
            return Err(FlagError(
                "`--input` cannot be combined with `--field` or `--raw-field`".to_string(),
            ));
        }
        if self.accept.is_some() && !self.preview.is_empty() {
            return Err(FlagError(
                "`--accept` cannot be combined with `--preview`".to_string(),
            ));
        }
        Ok(())
    }

    fn build_body(&self) -> anyhow::Result<Option<Value>> {
        if let Some(ref input_path) = self.input {
            let content = read_source(input_path)?;
            let parsed: Value = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse JSON from {input_path}"))?;
            return Ok(Some(parsed));
        }
        if self.field.is_empty() && self.raw_field.is_empty() {
            return Ok(None);
        }

        let mut body = Map::new();
        for field in &self.field {
            let (key, value) = split_field(field)?;
            let json_value = match value.strip_prefix('@') {
                Some(path) => Value::String(read_source(path)?),
                None => serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string())),
            };
            body.insert(key.to_string(), json_value);
        }
        for field in &self.raw_field {
            let (key, value) = split_field(field)?;
            body.insert(key.to_string(), Value::String(value.to_string()));
        }
        Ok(Some(Value::Object(body)))
    }
}

/// Send `req`, following every page when `paginate` is set.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn call(invoker: &Invoker, req: &RequestDescriptor, paginate: bool) -> Result<Value, hubcall_api::ApiError> {
    if paginate {
        Ok(Value::Array(invoker.invoke_multipage(req).await?))
    } else {
        invoker.invoke(req).await
    }
}

fn split_field(field: &str) -> Result<(&str, &str), FlagError> {
    field
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| FlagError(format!("field {field:?} is not in key=value format")))
}

fn read_source(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read file: {path}"))
}
