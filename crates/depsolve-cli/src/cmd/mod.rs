//! Subcommand implementations.

pub mod locate;
pub mod solve;
