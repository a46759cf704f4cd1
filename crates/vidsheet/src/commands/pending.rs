//! Module for the "pending" command

use libvidsheet::{
	fetch::build_client,
	main::filter::filter_pending,
};

use crate::{
	clap_conf::{
		CliDerive,
		CommandPending,
		PipelineKind,
	},
	utils,
};

/// Handler function for the "pending" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_pending(main_args: &CliDerive, sub_args: &CommandPending) -> Result<(), crate::Error> {
	let client = build_client()?;
	let store = utils::build_store(main_args, &client)?;
	let dataset = store.load()?;

	let columns = main_args.columns.to_column_names();
	let marker = match sub_args.pipeline {
		PipelineKind::Publish => &columns.publish_marker,
		PipelineKind::Update => &columns.update_marker,
	};

	let pending = filter_pending(&dataset, marker);

	for row in &pending {
		let title = row
			.get_non_empty(dataset.headers(), &columns.title)
			.unwrap_or("<no title>");

		println!("{:>5}  {}", row.index, title);
	}

	println!("{} of {} rows pending (marker column \"{}\")", pending.len(), dataset.len(), marker);

	return Ok(());
}
