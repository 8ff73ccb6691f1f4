//! Subcommand implementations.

pub mod keys;
pub mod message;
pub mod record;
