//! Module for the "completions" command

use std::io::{
	BufWriter,
	Write,
};

use clap::CommandFactory;
use clap_complete::generate;
use libvidsheet::error::IOErrorToError;

use crate::clap_conf::{
	CliDerive,
	CommandCompletions,
};

/// Handler function for the "completions" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_completions(_main_args: &CliDerive, sub_args: &CommandCompletions) -> Result<(), crate::Error> {
	let output: Box<dyn Write> = match &sub_args.output_file_path {
		Some(v) => {
			if v.exists() {
				return Err(crate::Error::other("Output file already exists"));
			}
			if let Some(parent) = v.parent() {
				std::fs::create_dir_all(parent).attach_path_err(parent)?;
			}
			Box::new(std::fs::File::create(v).attach_path_err(v)?)
		},
		None => Box::new(std::io::stdout()),
	};
	let mut writer = BufWriter::new(output);
	let mut parsed = CliDerive::command();
	let bin_name = parsed.get_bin_name().unwrap_or("vidsheet").to_owned();
	generate(sub_args.shell, &mut parsed, bin_name, &mut writer);

	writer.flush().attach_location_err("completions writer")?;

	return Ok(());
}
