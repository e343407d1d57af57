// server/src/cli/mod.rs

pub mod cli;
pub mod commands;
pub mod handlers;
pub mod logging;

pub use cli::{CliArgs, start_cli};
pub use commands::{Commands, ServeArgs};
