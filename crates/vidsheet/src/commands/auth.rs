//! Module for the "auth" command

use libvidsheet::fetch::build_client;

use crate::{
	clap_conf::{
		CliDerive,
		CommandAuth,
	},
	utils,
};

/// Handler function for the "auth" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_auth(main_args: &CliDerive, _sub_args: &CommandAuth) -> Result<(), crate::Error> {
	let client = build_client()?;

	let Some(mut provider) = utils::build_oauth(main_args, &client)? else {
		return Err(crate::Error::authorization(
			"\"--client-secrets\" is required for the authorization",
		));
	};

	provider.bootstrap()?;

	if let Some(path) = &main_args.host.token_cache_path {
		println!("Authorization done, token cached at \"{}\"", path.display());
	}

	return Ok(());
}
