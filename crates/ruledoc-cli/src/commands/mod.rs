//! Subcommand implementations.

pub mod generate;
pub mod init;
pub mod list_rules;
pub mod output;
