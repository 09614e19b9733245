//! Last-seen tracker CLI library.
//!
//! This crate provides the `seen` command-line interface over the tracker
//! core and the SQLite-backed store.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
