//! Module containing [`MediaAcquirer`], the local media cache

use std::path::{
	Path,
	PathBuf,
};

use reqwest::blocking::Client;

use crate::{
	error::IOErrorToError,
	utils::sanitize_title,
};

/// Extension used for cache files when none is configured
pub const DEFAULT_MEDIA_EXTENSION: &str = "mp4";
/// Extension appended to cache files while they are still downloading
const PARTIAL_EXTENSION: &str = "part";

/// Provides the local media file for a row: either already cached, or fetched from its remote location
#[derive(Debug, Clone)]
pub struct MediaAcquirer {
	/// Directory containing all cached media
	cache_dir: PathBuf,
	/// Extension used for the cached file names
	extension: String,
	client:    Client,
}

impl MediaAcquirer {
	/// Create a new instance of [`MediaAcquirer`]
	pub fn new<P: AsRef<Path>>(cache_dir: P, client: Client) -> Self {
		return Self {
			cache_dir: cache_dir.as_ref().to_owned(),
			extension: DEFAULT_MEDIA_EXTENSION.to_owned(),
			client,
		};
	}

	/// Builder function to set a different cache file extension
	#[must_use]
	pub fn with_extension<E: AsRef<str>>(mut self, extension: E) -> Self {
		self.extension = extension.as_ref().trim_start_matches('.').to_owned();

		return self;
	}

	/// Get the path the media for `title` is cached at
	#[must_use]
	pub fn cached_path(&self, title: &str) -> PathBuf {
		return self
			.cache_dir
			.join(format!("{}.{}", sanitize_title(title), self.extension));
	}

	/// Get the local file for `title`, downloading it from `url` if it is not cached yet
	///
	/// Downloads go into a ".part" file first, which is only renamed once complete
	pub fn acquire(&self, title: &str, url: &str) -> Result<PathBuf, crate::Error> {
		let path = self.cached_path(title);

		if path.is_file() {
			debug!("Using cached media \"{}\"", path.display());
			return Ok(path);
		}

		std::fs::create_dir_all(&self.cache_dir).attach_path_err(&self.cache_dir)?;

		let mut partial = path.clone().into_os_string();
		partial.push(".");
		partial.push(PARTIAL_EXTENSION);
		let partial = PathBuf::from(partial);

		info!("Downloading media for \"{}\" from \"{}\"", title, url);

		match super::get_to_file(&self.client, url, &partial) {
			Ok(size) => debug!("Downloaded {} bytes into \"{}\"", size, partial.display()),
			Err(err) => {
				remove_partial(&partial);
				return Err(err);
			},
		}

		std::fs::rename(&partial, &path).attach_path_err(&path)?;

		return Ok(path);
	}
}

/// Tries to remove the given file, ignoring if the file does not exist and otherwise just logging the error
fn remove_partial(path: &Path) {
	std::fs::remove_file(path).unwrap_or_else(|err| {
		if err.kind() != std::io::ErrorKind::NotFound {
			info!("Error removing partial media file. Error: {}", err);
		}
	});
}

#[cfg(test)]
mod test {
	use super::*;
	use tempfile::Builder as TempBuilder;
	use wiremock::{
		Mock,
		MockServer,
		ResponseTemplate,
		matchers::{
			method,
			path,
		},
	};

	#[test]
	fn test_cached_path() {
		let acquirer = MediaAcquirer::new("/cache", Client::new()).with_extension(".mkv");

		assert_eq!(PathBuf::from("/cache/My_Video_.mkv"), acquirer.cached_path("My Video!"));
	}

	#[tokio::test]
	async fn test_uses_cache_without_request() {
		let server = MockServer::start().await;
		// no request may reach the server
		Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

		let testdir = TempBuilder::new()
			.prefix("vidsheet-test-media-")
			.tempdir()
			.expect("Expected a temp dir to be created");
		let cache_dir = testdir.path().to_owned();
		std::fs::write(cache_dir.join("Cached.mp4"), b"data").expect("Expected write to work");

		let url = format!("{}/cached.mp4", server.uri());
		let res = tokio::task::spawn_blocking(move || {
			let acquirer = MediaAcquirer::new(&cache_dir, Client::new());
			return acquirer.acquire("Cached", &url);
		})
		.await
		.expect("Expected the blocking task to finish");

		assert_eq!(testdir.path().join("Cached.mp4"), res.expect("Expected acquire to work"));
	}

	#[tokio::test]
	async fn test_downloads_missing_media() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/video.mp4"))
			.respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-bytes".to_vec()))
			.expect(1)
			.mount(&server)
			.await;

		let testdir = TempBuilder::new()
			.prefix("vidsheet-test-media-")
			.tempdir()
			.expect("Expected a temp dir to be created");
		let cache_dir = testdir.path().join("nested");

		let url = format!("{}/video.mp4", server.uri());
		let res = tokio::task::spawn_blocking(move || {
			let acquirer = MediaAcquirer::new(&cache_dir, Client::new());
			return acquirer.acquire("New Video", &url);
		})
		.await
		.expect("Expected the blocking task to finish")
		.expect("Expected acquire to work");

		assert_eq!(testdir.path().join("nested/New_Video.mp4"), res);
		assert_eq!(b"video-bytes".to_vec(), std::fs::read(&res).expect("Expected file to exist"));
		assert!(!testdir.path().join("nested/New_Video.mp4.part").exists());
	}

	#[tokio::test]
	async fn test_failed_download_leaves_no_file() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let testdir = TempBuilder::new()
			.prefix("vidsheet-test-media-")
			.tempdir()
			.expect("Expected a temp dir to be created");
		let cache_dir = testdir.path().to_owned();

		let url = format!("{}/missing.mp4", server.uri());
		let res = tokio::task::spawn_blocking(move || {
			let acquirer = MediaAcquirer::new(&cache_dir, Client::new());
			return acquirer.acquire("Missing", &url);
		})
		.await
		.expect("Expected the blocking task to finish");

		assert!(res.is_err());
		assert!(!testdir.path().join("Missing.mp4").exists());
		assert!(!testdir.path().join("Missing.mp4.part").exists());
	}
}
