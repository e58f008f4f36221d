//! CLI module for insightdb
//!
//! Provides command-line interface for:
//! - query: One-shot query execution (JSON on stdin, JSON on stdout)
//! - list / add / remove: Dataset management
//! - schedule: Room scheduling over two stored datasets

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, KindArg};
pub use commands::{
    add, build_schedule, handle_add, handle_query, list, query, remove, run, run_command,
    schedule, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, parse_request, read_request, write_error, write_response};
