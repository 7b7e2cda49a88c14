//! `hubcall config reset` command.

use anyhow::Result;
use clap::Args;

use super::{load, save, usage_error};
use crate::factory::Factory;

/// Restore a configuration key to its default.
#[derive(Debug, Args)]
pub struct ResetArgs {
    /// The configuration key to reset.
    key: String,
}

impl ResetArgs {
    /// Run the config reset command.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the file cannot be written.
    pub fn run(&self, factory: &Factory) -> Result<()> {
        let mut settings = load(factory)?;
        settings.reset(&self.key).map_err(usage_error)?;
        save(factory, &settings)
    }
}

#[cfg(test)]
mod tests {
    use hubcall_core::Settings;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::testing;

    #[test]
    fn test_should_restore_default() {
        let (factory, _output, dir) = testing::factory();
        let mut settings = Settings::default();
        settings.set("api_host_name", "ghe.example.com").unwrap();
        settings.set("log_request_body", "true").unwrap();
        settings.save_to(dir.path()).unwrap();

        ResetArgs {
            key: "api_host_name".to_string(),
        }
        .run(&factory)
        .unwrap();

        let saved = Settings::load_from(dir.path()).unwrap();
        assert_eq!(saved.api_host_name, "github.com");
        assert!(saved.log_request_body);
    }

    #[test]
    fn test_should_reject_unknown_key() {
        let (factory, _output, _dir) = testing::factory();
        let result = ResetArgs {
            key: "pager".to_string(),
        }
        .run(&factory);
        assert!(result.is_err());
    }
}
