//! Module for the "publish" command

use libvidsheet::{
	fetch::{
		build_client,
		media::MediaAcquirer,
	},
	main::publish::PublishAction,
};

use crate::{
	clap_conf::{
		CliDerive,
		CommandPublish,
		PipelineKind,
	},
	state::RunState,
	utils,
};

/// Handler function for the "publish" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_publish(main_args: &CliDerive, sub_args: &CommandPublish) -> Result<(), crate::Error> {
	let client = build_client()?;
	// decided before anything is loaded, so that missing credentials fail early
	let mut host = utils::select_host(main_args, &client, PipelineKind::Publish)?;
	let store = utils::build_store(main_args, &client)?;

	let cache_path = sub_args
		.media_cache_path
		.as_ref()
		.ok_or_else(|| return crate::Error::other("Expected \"Check\" to have set a media cache path"))?;
	let media = MediaAcquirer::new(cache_path, client).with_extension(&sub_args.media_extension);

	let state = RunState::new(main_args.columns.to_column_names(), sub_args.match_by)
		.with_publish_defaults(sub_args.visibility, sub_args.category_id.clone());

	info!(
		"Publishing from \"{}\" to {} (matching by {})",
		store.path().display(),
		host.name(),
		sub_args.match_by
	);

	let mut action = PublishAction::new(host.as_mut(), &media, &state);
	super::run_pipeline(main_args, &store, &mut action)?;

	return Ok(());
}
