//! Classic project board commands (`hubcall project`).
//!
//! Moves columns and cards. Exactly one of `--first`, `--last` or
//! `--after <id>` selects the new position.

pub mod card;
pub mod column;

use clap::{Args, Subcommand};
use hubcall_api::{ApiError, RequestDescriptor};

use crate::factory::Factory;

/// Media type that unlocks the classic projects API.
pub const PROJECTS_ACCEPT: &str = "application/vnd.github.inertia-preview+json";

/// Manage classic project boards.
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Manage project columns.
    #[command(subcommand)]
    Column(ColumnCommand),
    /// Manage project cards.
    #[command(subcommand)]
    Card(CardCommand),
}

/// Project column subcommands.
#[derive(Debug, Subcommand)]
pub enum ColumnCommand {
    /// Move a column within its project.
    Move(column::MoveArgs),
}

/// Project card subcommands.
#[derive(Debug, Subcommand)]
pub enum CardCommand {
    /// Move a card within or across columns.
    Move(card::MoveArgs),
}

impl ProjectCommand {
    /// Run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub async fn run(&self, factory: &Factory) -> anyhow::Result<()> {
        match self {
            Self::Column(ColumnCommand::Move(args)) => args.run(factory).await,
            Self::Card(CardCommand::Move(args)) => args.run(factory).await,
        }
    }
}

/// Where to place a column or card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Before every sibling.
    First,
    /// After every sibling.
    Last,
    /// Directly after the sibling with this id.
    After(u64),
}

impl Position {
    /// Build a position from the mutually exclusive flags.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless exactly one flag is set.
    pub fn from_flags(first: bool, last: bool, after: Option<u64>) -> Result<Self, ApiError> {
        match (first, last, after) {
            (true, false, None) => Ok(Self::First),
            (false, true, None) => Ok(Self::Last),
            (false, false, Some(id)) => Ok(Self::After(id)),
            (false, false, None) => Err(ApiError::Validation(
                "one of --first, --last or --after is required".to_string(),
            )),
            _ => Err(ApiError::Validation(
                "--first, --last and --after are mutually exclusive".to_string(),
            )),
        }
    }

    /// Wire form for columns: `first`, `last` or `after:<id>`.
    pub fn column_value(self) -> String {
        match self {
            Self::First => "first".to_string(),
            Self::Last => "last".to_string(),
            Self::After(id) => format!("after:{id}"),
        }
    }

    /// Wire form for cards: `top`, `bottom` or `after:<id>`.
    pub fn card_value(self) -> String {
        match self {
            Self::First => "top".to_string(),
            Self::Last => "bottom".to_string(),
            Self::After(id) => format!("after:{id}"),
        }
    }
}

/// Position flags shared by the move commands.
#[derive(Debug, Args)]
pub struct PositionArgs {
    /// Move to the first position.
    #[arg(long)]
    first: bool,

    /// Move to the last position.
    #[arg(long)]
    last: bool,

    /// Move directly after the sibling with this id.
    #[arg(long, value_name = "ID")]
    after: Option<u64>,
}

impl PositionArgs {
    /// The selected position.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless exactly one flag is set.
    pub fn position(&self) -> Result<Position, ApiError> {
        Position::from_flags(self.first, self.last, self.after)
    }
}

fn request(req: RequestDescriptor) -> RequestDescriptor {
    req.with_accept(PROJECTS_ACCEPT)
}
