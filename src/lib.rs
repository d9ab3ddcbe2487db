//! Clipper bookmark synchronization
//!
//! Binary-side glue: configuration loading, tracing setup, adapter wiring and
//! the command-line session that drives the bookmark runtime.

pub mod bootstrap;
pub mod cli;

pub use bootstrap::{init_tracing_subscriber, load_config, resolve_config, run_command};
pub use cli::{Cli, Command};
