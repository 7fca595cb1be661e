//! Tooling & Integration Layer
//!
//! Command-line access to the composition engine.

pub mod cli;

pub use cli::{AssemblyCommands, Cli, CliContext, Commands};
