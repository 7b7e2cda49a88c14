//! `hubcall project column move` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::{Value, json};

use super::{Position, PositionArgs, request};
use crate::factory::Factory;

/// Move a project column.
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Column id.
    #[arg(value_name = "COLUMN_ID")]
    column_id: u64,

    #[command(flatten)]
    position: PositionArgs,
}

/// Move column `column_id` to `position`.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn move_column(invoker: &Invoker, column_id: u64, position: Position) -> Result<Value, ApiError> {
    let req = request(
        RequestDescriptor::post(
            format!("projects/columns/{column_id}/moves"),
            json!({ "position": position.column_value() }),
        )
        .with_telemetry_event("MoveGitHubProjectColumn")
        .with_description(format!("Moving project column {column_id}")),
    );
    invoker.invoke(&req).await
}

impl MoveArgs {
    /// Run the column move command.
    ///
    /// # Errors
    ///
    /// Returns a validation error for conflicting position flags, otherwise
    /// an error if the column cannot be moved.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let position = self.position.position()?;
        let invoker = factory.invoker()?;
        let moved = move_column(&invoker, self.column_id, position)
            .await
            .with_context(|| format!("failed to move column {}", self.column_id))?;
        factory.io.print_json(&moved)
    }
}
