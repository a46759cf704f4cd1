//! Module for fetching remote resources over plain HTTP

use std::{
	fs::File,
	io::BufWriter,
	path::Path,
};

pub use reqwest::blocking::Client;

use crate::error::IOErrorToError;

pub mod media;

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("vidsheet/", env!("CARGO_PKG_VERSION"));

/// Create the HTTP client used for all requests of a run
///
/// No custom timeout is set, the client defaults are used.
pub fn build_client() -> Result<Client, crate::Error> {
	return Ok(Client::builder().user_agent(USER_AGENT).build()?);
}

/// GET `url` and return the body as text, any non-success status is a error
pub fn get_text(client: &Client, url: &str) -> Result<String, crate::Error> {
	debug!("GET \"{}\"", url);

	return Ok(client.get(url).send()?.error_for_status()?.text()?);
}

/// GET `url` and stream the body into a new file at `path`
///
/// The file is created (or truncated), it is not removed again on error.
pub fn get_to_file(client: &Client, url: &str, path: &Path) -> Result<u64, crate::Error> {
	debug!("GET \"{}\" into \"{}\"", url, path.display());

	let mut response = client.get(url).send()?.error_for_status()?;
	let mut writer = BufWriter::new(File::create(path).attach_path_err(path)?);

	let written = response.copy_to(&mut writer)?;

	writer
		.into_inner()
		.map_err(|err| return err.into_error())
		.attach_path_err(path)?
		.sync_all()
		.attach_path_err(path)?;

	return Ok(written);
}
