//! `hubcall config get` command.

use anyhow::Result;
use clap::Args;

use super::{load, usage_error};
use crate::factory::Factory;

/// Print the value of a given configuration key.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// The configuration key to read.
    key: String,
}

impl GetArgs {
    /// Run the config get command.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the file cannot be read.
    pub fn run(&self, factory: &Factory) -> Result<()> {
        let settings = load(factory)?;
        let value = settings.get(&self.key).map_err(usage_error)?;
        factory.io.println(&value)?;
        Ok(())
    }
}
