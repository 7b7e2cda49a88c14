//! Command implementations for hubcall.
//!
//! Every command resolves its repository, builds request descriptors and
//! hands them to a [`hubcall_api::Invoker`] obtained from the [`factory`].
//! The typed functions (`list_labels`, `move_column`, ...) are usable
//! without the clap layer.

pub mod api;
pub mod branch;
pub mod config;
pub mod decorate;
pub mod environment;
pub mod event;
pub mod factory;
pub mod graphql;
pub mod issue;
pub mod label;
pub mod milestone;
pub mod project;
pub mod repo_ref;
pub mod team;
pub mod traffic;

#[cfg(test)]
pub mod test_helpers;
