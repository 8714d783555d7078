//! CLI module
//!
//! Command-line interface over the API client.
//!
//! # Commands
//!
//! - `user` - Show the account behind the active credentials
//! - `get` - Issue a GET request and print the raw response
//! - `list` - Walk every page of a list endpoint
//! - `auth` - Show which authentication scheme is configured

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
