//! Utils for the `vidsheet` binary

use std::{
	borrow::Cow,
	io::Write,
};

use indicatif::{
	ProgressBar,
	ProgressDrawTarget,
};
use libvidsheet::{
	auth::{
		AuthorizationProvider,
		CodePrompt,
		StaticToken,
		oauth::{
			ClientSecret,
			OAuthProvider,
		},
	},
	data::store::{
		DatasetStore,
		Mirror,
	},
	error::IOErrorToError,
	fetch::Client,
	host::{
		VideoHost,
		api::YoutubeApi,
		simulated::SimulatedHost,
	},
};
use unicode_segmentation::UnicodeSegmentation;

use crate::clap_conf::{
	CliDerive,
	PipelineKind,
};

/// Helper function to set the progressbar to a draw target if mode is interactive
pub fn set_progressbar(bar: &ProgressBar, main_args: &CliDerive) {
	if main_args.is_interactive() {
		bar.set_draw_target(ProgressDrawTarget::stderr());
	}
}

/// Build the [`DatasetStore`] from the arguments, with a mirror if one is set
pub fn build_store(main_args: &CliDerive, client: &Client) -> Result<DatasetStore, crate::Error> {
	let path = main_args
		.source
		.dataset_path
		.as_ref()
		.ok_or_else(|| return crate::Error::other("Expected \"Check\" to have required a dataset path"))?;

	let store = DatasetStore::new(path);

	return Ok(match &main_args.source.mirror_url {
		Some(url) => store.with_mirror(Mirror::new(url, client.clone())),
		None => store,
	});
}

/// Prompt on STDIN for the authorization code
#[derive(Debug, Default)]
pub struct StdinCodePrompt;

impl CodePrompt for StdinCodePrompt {
	fn prompt_code(&mut self, auth_url: &str) -> Result<String, crate::Error> {
		println!("Please visit this URL to authorize this application:\n{auth_url}\n");

		loop {
			print!("Enter the authorization code: ");
			// ensure the message is printed before reading
			std::io::stdout().flush().attach_location_err("stdout flush")?;

			let mut input = String::new();
			let read = std::io::stdin().read_line(&mut input).attach_location_err("stdin read")?;

			// EOF, there will never be a code
			if read == 0 {
				return Err(crate::Error::authorization("No authorization code was entered"));
			}

			let input = input.trim();

			if !input.is_empty() {
				return Ok(input.to_owned());
			}

			println!("... Invalid Input: (Empty)");
		}
	}
}

/// Build the OAuth provider from the arguments, [None] if no client secrets are set
pub fn build_oauth(main_args: &CliDerive, client: &Client) -> Result<Option<OAuthProvider>, crate::Error> {
	let Some(secrets_path) = &main_args.host.client_secrets_path else {
		return Ok(None);
	};
	let token_path = main_args
		.host
		.token_cache_path
		.as_ref()
		.ok_or_else(|| return crate::Error::other("Expected \"Check\" to have set a token cache path"))?;

	return Ok(Some(OAuthProvider::new(
		ClientSecret::from_file(secrets_path)?,
		token_path,
		client.clone(),
		Box::new(StdinCodePrompt),
	)));
}

/// Build the credential provider from the arguments, a static token is preferred over the OAuth flow
pub fn build_provider(
	main_args: &CliDerive,
	client: &Client,
) -> Result<Option<Box<dyn AuthorizationProvider>>, crate::Error> {
	if let Some(token) = &main_args.host.access_token {
		return Ok(Some(Box::new(StaticToken::new(token))));
	}

	return Ok(build_oauth(main_args, client)?.map(|v| return Box::new(v) as Box<dyn AuthorizationProvider>));
}

/// Decide once which [`VideoHost`] is used for this run
///
/// Without any credentials "update" falls back to the simulated host, while "publish" refuses to run.
pub fn select_host(main_args: &CliDerive, client: &Client, pipeline: PipelineKind) -> Result<Box<dyn VideoHost>, crate::Error> {
	if main_args.host.dry_run {
		info!("Dry-run, using the simulated host");
		return Ok(Box::new(SimulatedHost::new()));
	}

	if let Some(provider) = build_provider(main_args, client)? {
		return Ok(Box::new(YoutubeApi::new(client.clone(), provider)));
	}

	return match pipeline {
		PipelineKind::Update => {
			warn!("No credentials configured, using the simulated host (nothing will be changed on the platform)");
			Ok(Box::new(SimulatedHost::new()))
		},
		PipelineKind::Publish => Err(crate::Error::authorization(
			"No credentials configured, set \"--client-secrets\" or \"--access-token\" (or use \"--dry-run\")",
		)),
	};
}

/// Static size of the progress-bar style without the message, see "BATCH_STYLE"
pub const STYLE_STATIC_SIZE: usize = "[00/00] [00:00:00] ".len() + 40 + 1;

/// Truncate the given message to a lower size so that the progressbar does not do new-lines
pub fn truncate_message_term_width<M>(msg: &M) -> String
where
	M: AsRef<str>,
{
	let display_width_available = terminal_size::terminal_size().map(|(w, _h)| {
		return (w.0 as usize).saturating_sub(STYLE_STATIC_SIZE);
	});

	let Some(display_width_available) = display_width_available else {
		return msg.as_ref().into();
	};

	return truncate_message_display_pos(msg, display_width_available, true).to_string();
}

/// Truncate `msg` so that it takes at most `display_pos` terminal columns
///
/// Truncation happens at grapheme boundaries, with `add_ellipsis` the last fitting column is replaced with "…"
pub fn truncate_message_display_pos<M>(msg: &M, display_pos: usize, add_ellipsis: bool) -> Cow<'_, str>
where
	M: AsRef<str> + ?Sized,
{
	let msg = msg.as_ref();

	if display_width(msg) <= display_pos {
		return Cow::Borrowed(msg);
	}

	let budget = if add_ellipsis {
		display_pos.saturating_sub(1)
	} else {
		display_pos
	};

	let mut used = 0;
	let mut end = 0;

	for (index, grapheme) in msg.grapheme_indices(true) {
		let width = display_width(grapheme);

		if used + width > budget {
			break;
		}

		used += width;
		end = index + grapheme.len();
	}

	let mut truncated = msg[..end].to_owned();

	if add_ellipsis && display_pos > 0 {
		truncated.push('…');
	}

	return Cow::Owned(truncated);
}

/// Get the display width of `msg`
fn display_width(msg: &str) -> usize {
	return unicode_width::UnicodeWidthStr::width(msg);
}
