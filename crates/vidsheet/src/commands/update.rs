//! Module for the "update" command

use libvidsheet::{
	fetch::build_client,
	main::update::UpdateAction,
};

use crate::{
	clap_conf::{
		CliDerive,
		CommandUpdate,
		PipelineKind,
	},
	state::RunState,
	utils,
};

/// Handler function for the "update" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_update(main_args: &CliDerive, sub_args: &CommandUpdate) -> Result<(), crate::Error> {
	let client = build_client()?;
	let mut host = utils::select_host(main_args, &client, PipelineKind::Update)?;
	let store = utils::build_store(main_args, &client)?;

	let state = RunState::new(main_args.columns.to_column_names(), sub_args.match_by);

	info!(
		"Updating descriptions from \"{}\" on {} (matching by {})",
		store.path().display(),
		host.name(),
		sub_args.match_by
	);

	let mut action = UpdateAction::new(host.as_mut(), &state);
	super::run_pipeline(main_args, &store, &mut action)?;

	return Ok(());
}
