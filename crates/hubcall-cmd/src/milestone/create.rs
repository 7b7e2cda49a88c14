//! `hubcall milestone create` command.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::Value;

use crate::factory::Factory;
use crate::repo_ref::RepoRef;

/// Create a milestone.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Milestone title.
    #[arg(value_name = "TITLE")]
    title: String,

    /// Repository (OWNER/REPO or URL).
    #[arg(short = 'R', long)]
    repo: Option<String>,

    /// Initial state.
    #[arg(short, long, value_parser = ["open", "closed"], default_value = "open")]
    state: String,

    /// Milestone description.
    #[arg(short, long)]
    description: Option<String>,

    /// Due date (YYYY-MM-DD or RFC 3339).
    #[arg(long)]
    due_on: Option<String>,
}

/// Options for [`create_milestone`].
#[derive(Debug, Clone)]
pub struct CreateMilestoneOptions {
    /// Repository to add the milestone to.
    pub repo: RepoRef,
    /// Title.
    pub title: String,
    /// `open` or `closed`.
    pub state: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional due date.
    pub due_on: Option<String>,
}

/// Normalize a due date to 09:00 UTC on the given day.
///
/// GitHub stores only the date of `due_on`.
///
/// # Errors
///
/// Returns a validation error if the value is neither a date nor an RFC 3339
/// timestamp.
pub fn normalize_due_on(input: &str) -> Result<String, ApiError> {
    let input = input.trim();
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "invalid due date {input:?}: expected YYYY-MM-DD or an RFC 3339 timestamp"
            ))
        })?;
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();
    Ok(date.and_time(nine).and_utc().format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Create a milestone.
///
/// # Errors
///
/// Returns a validation error for a malformed due date, otherwise the
/// invoker's error.
pub async fn create_milestone(
    invoker: &Invoker,
    opts: &CreateMilestoneOptions,
) -> Result<Value, ApiError> {
    let mut body = serde_json::json!({
        "title": opts.title,
        "state": opts.state,
    });
    if let Some(ref desc) = opts.description {
        body["description"] = Value::String(desc.clone());
    }
    if let Some(ref due_on) = opts.due_on {
        body["due_on"] = Value::String(normalize_due_on(due_on)?);
    }

    let req = opts.repo.tag(
        RequestDescriptor::post(format!("{}/milestones", opts.repo.api_path()), body)
            .with_telemetry_event("NewGitHubMilestone"),
    );
    let mut milestone = invoker.invoke(&req).await?;
    super::decorate_milestones(&mut milestone, &opts.repo, invoker.settings());
    Ok(milestone)
}

impl CreateArgs {
    /// Run the milestone create command.
    ///
    /// # Errors
    ///
    /// Returns an error if the milestone cannot be created.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let repo = RepoRef::resolve(self.repo.as_deref(), factory.settings()?)?;
        let invoker = factory.invoker()?;
        let opts = CreateMilestoneOptions {
            repo,
            title: self.title.clone(),
            state: self.state.clone(),
            description: self.description.clone(),
            due_on: self.due_on.clone(),
        };
        let milestone = create_milestone(&invoker, &opts)
            .await
            .context("failed to create milestone")?;
        factory.io.print_json(&milestone)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::test_helpers::TestHarness;

    #[rstest]
    #[case("2026-03-01", "2026-03-01T09:00:00Z")]
    #[case(" 2026-12-31 ", "2026-12-31T09:00:00Z")]
    #[case("2026-03-01T23:30:00-02:00", "2026-03-02T09:00:00Z")]
    #[case("2026-03-01T00:00:00Z", "2026-03-01T09:00:00Z")]
    fn test_should_normalize_due_on(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_due_on(input).unwrap(), expected);
    }

    #[rstest]
    #[case("tomorrow")]
    #[case("2026-13-01")]
    #[case("")]
    fn test_should_reject_bad_due_on(#[case] input: &str) {
        assert!(normalize_due_on(input).is_err());
    }

    #[tokio::test]
    async fn test_should_create_milestone_with_due_date() {
        let h = TestHarness::new().await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/milestones"))
            .and(body_json(json!({
                "title": "v1.0",
                "state": "open",
                "due_on": "2026-06-30T09:00:00Z"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"number": 7, "title": "v1.0"})),
            )
            .expect(1)
            .mount(&h.server)
            .await;

        let args = CreateArgs {
            title: "v1.0".into(),
            repo: None,
            state: "open".into(),
            description: None,
            due_on: Some("2026-06-30".into()),
        };
        args.run(&h.factory).await.unwrap();
        assert_eq!(h.stdout_json()["milestone_number"], 7);
    }
}
