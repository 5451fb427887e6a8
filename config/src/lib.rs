//! Command line and config file parsing for the vault tooling
//!
//! Options may be given on the command line, through the environment, or in
//! a TOML file passed via `--config-file`; command line values take
//! precedence over the file

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod cli;
mod parsing;
mod validation;

pub use cli::{Cli, Command, VaultConfig};
pub use parsing::{parse_command_line_args, parse_config_from_file};
