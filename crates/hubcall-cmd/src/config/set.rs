//! `hubcall config set` command.

use anyhow::Result;
use clap::Args;

use super::{load, save, usage_error};
use crate::factory::Factory;

/// Update configuration with a value for the given key.
#[derive(Debug, Args)]
pub struct SetArgs {
    /// The configuration key to set.
    key: String,
    /// The value to set.
    value: String,
}

impl SetArgs {
    /// Run the config set command.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is invalid or cannot be saved.
    pub fn run(&self, factory: &Factory) -> Result<()> {
        let mut settings = load(factory)?;
        settings.set(&self.key, &self.value).map_err(usage_error)?;
        save(factory, &settings)?;
        tracing::debug!(key = %self.key, "configuration updated");
        Ok(())
    }
}
