//! `molten` command-line front end: preview, import and export inventory
//! files against a JSON catalog and a JSON inventory snapshot.

pub mod cli;
pub mod commands;
pub mod prompt;
pub mod snapshot;

pub use cli::{Cli, Commands};
pub use commands::run;
