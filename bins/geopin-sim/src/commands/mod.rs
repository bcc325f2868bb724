//! Subcommand implementations

pub mod distance;
pub mod run;
