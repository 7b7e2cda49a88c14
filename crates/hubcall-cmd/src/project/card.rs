//! `hubcall project card move` command.

use anyhow::{Context, Result};
use clap::Args;
use hubcall_api::{ApiError, Invoker, RequestDescriptor};
use serde_json::{Value, json};

use super::{Position, PositionArgs, request};
use crate::factory::Factory;

/// Move a project card.
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Card id.
    #[arg(value_name = "CARD_ID")]
    card_id: u64,

    /// Column to move the card into.
    #[arg(long, value_name = "COLUMN_ID")]
    column: Option<u64>,

    #[command(flatten)]
    position: PositionArgs,
}

/// Move card `card_id` to `position`, optionally into `column_id`.
///
/// # Errors
///
/// Returns the invoker's error.
pub async fn move_card(
    invoker: &Invoker,
    card_id: u64,
    position: Position,
    column_id: Option<u64>,
) -> Result<Value, ApiError> {
    let mut body = json!({ "position": position.card_value() });
    if let Some(column_id) = column_id {
        body["column_id"] = json!(column_id);
    }
    let req = request(
        RequestDescriptor::post(format!("projects/columns/cards/{card_id}/moves"), body)
            .with_telemetry_event("MoveGitHubProjectCard")
            .with_description(format!("Moving project card {card_id}")),
    );
    invoker.invoke(&req).await
}

impl MoveArgs {
    /// Run the card move command.
    ///
    /// # Errors
    ///
    /// Returns a validation error for conflicting position flags, otherwise
    /// an error if the card cannot be moved.
    pub async fn run(&self, factory: &Factory) -> Result<()> {
        let position = self.position.position()?;
        let invoker = factory.invoker()?;
        let moved = move_card(&invoker, self.card_id, position, self.column)
            .await
            .with_context(|| format!("failed to move card {}", self.card_id))?;
        factory.io.print_json(&moved)
    }
}
