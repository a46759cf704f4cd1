#![allow(clippy::needless_return)]
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

pub use libvidsheet::Error;

mod clap_conf;
use clap_conf::*;

mod commands;
mod logger;
mod state;
mod utils;

/// Main
fn main() -> Result<(), crate::Error> {
	let logger_handle = logger::setup_logger()?;

	let cli_matches = CliDerive::custom_parse()?;

	log::info!("CLI Verbosity is {}", cli_matches.verbosity);

	// apply cli "verbosity" argument to the log level
	logger_handle.set_new_spec(logger::verbosity_spec(cli_matches.verbosity).ok_or_else(|| {
		return crate::Error::other("Expected verbosity integer range between 0 and 3 (inclusive)");
	})?);

	if cli_matches.enable_colors() {
		colored::control::set_override(true);
	}

	match &cli_matches.subcommands {
		SubCommands::Publish(v) => commands::publish::command_publish(&cli_matches, v),
		SubCommands::Update(v) => commands::update::command_update(&cli_matches, v),
		SubCommands::Pending(v) => commands::pending::command_pending(&cli_matches, v),
		SubCommands::Schedule(v) => commands::schedule::command_schedule(&cli_matches, v),
		SubCommands::Auth(v) => commands::auth::command_auth(&cli_matches, v),
		SubCommands::Completions(v) => commands::completions::command_completions(&cli_matches, v),
	}?;

	return Ok(());
}
