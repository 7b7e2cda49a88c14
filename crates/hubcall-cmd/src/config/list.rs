//! `hubcall config list` command.

use anyhow::Result;
use clap::Args;
use hubcall_core::config::CONFIG_OPTIONS;

use super::load;
use crate::factory::Factory;

/// Print a list of configuration keys and values.
#[derive(Debug, Args)]
pub struct ListArgs {}

impl ListArgs {
    /// Run the config list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    pub fn run(&self, factory: &Factory) -> Result<()> {
        let settings = load(factory)?;
        for option in CONFIG_OPTIONS {
            let value = settings.get(option.key)?;
            factory.io.println(&format!("{}={value}", option.key))?;
        }
        Ok(())
    }
}
