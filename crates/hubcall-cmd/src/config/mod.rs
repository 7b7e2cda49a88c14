//! Configuration commands (`hubcall config`).
//!
//! These read and write the files in the configuration directory directly,
//! so command-line and environment overrides never leak into them.

pub mod get;
pub mod list;
pub mod reset;
pub mod set;

use anyhow::Context;
use clap::Subcommand;
use hubcall_core::Settings;
use hubcall_core::cmdutil::FlagError;
use hubcall_core::errors::ConfigError;

use crate::factory::Factory;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the value of a given configuration key.
    Get(get::GetArgs),
    /// Update configuration with a value for the given key.
    Set(set::SetArgs),
    /// Print a list of configuration keys and values.
    #[command(alias = "ls")]
    List(list::ListArgs),
    /// Restore a configuration key to its default.
    Reset(reset::ResetArgs),
}

impl ConfigCommand {
    /// Run the appropriate config subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the subcommand fails.
    pub fn run(&self, factory: &Factory) -> anyhow::Result<()> {
        match self {
            Self::Get(args) => args.run(factory),
            Self::Set(args) => args.run(factory),
            Self::List(args) => args.run(factory),
            Self::Reset(args) => args.run(factory),
        }
    }
}

fn load(factory: &Factory) -> anyhow::Result<Settings> {
    let dir = factory.config_dir();
    Settings::load_from(&dir).with_context(|| format!("failed to load configuration from {}", dir.display()))
}

fn save(factory: &Factory, settings: &Settings) -> anyhow::Result<()> {
    let dir = factory.config_dir();
    settings
        .save_to(&dir)
        .with_context(|| format!("failed to save configuration to {}", dir.display()))
}

/// Report bad keys and values as usage errors.
fn usage_error(err: ConfigError) -> anyhow::Error {
    if matches!(err, ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. }) {
        FlagError(err.to_string()).into()
    } else {
        err.into()
    }
}
