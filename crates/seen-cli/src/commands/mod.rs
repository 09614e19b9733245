//! CLI subcommand implementations.

pub mod last;
pub mod mark;
pub mod watch;
