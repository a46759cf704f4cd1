//! Module containing [`SimulatedHost`], the dry-run implementation of [`VideoHost`]

use std::{
	collections::HashMap,
	path::{
		Path,
		PathBuf,
	},
};

use super::{
	Snippet,
	VideoHost,
	VideoMetadata,
};
use crate::utils::sanitize_title;

/// A call that was made on a [`SimulatedHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedCall {
	/// values: (title, media path)
	Upload(String, PathBuf),
	/// values: (video id)
	FetchSnippet(String),
	/// values: (video id, new description)
	UpdateSnippet(String, String),
}

/// Does not contact any platform: every action succeeds (unless a failure is injected) and is only logged and recorded
///
/// Used when running without credentials, so that the row bookkeeping can still be exercised.
#[derive(Debug, Default)]
pub struct SimulatedHost {
	/// All calls in the order they were made
	calls:    Vec<SimulatedCall>,
	/// Snippets returned by [`VideoHost::fetch_snippet`], updated by [`VideoHost::update_snippet`]
	snippets: HashMap<String, Snippet>,
	/// Errors to return instead of succeeding, keyed by title (upload) or video id (fetch / update)
	failures: HashMap<String, crate::Error>,
}

impl SimulatedHost {
	/// Create a new empty instance
	pub fn new() -> Self {
		return Self::default();
	}

	/// Builder function to preset the snippet returned for `video_id`
	#[must_use]
	pub fn with_snippet<I: Into<String>>(mut self, video_id: I, snippet: Snippet) -> Self {
		self.snippets.insert(video_id.into(), snippet);

		return self;
	}

	/// Builder function to make any call for `key` (title or video id) fail with `err`
	#[must_use]
	pub fn with_failure<K: Into<String>>(mut self, key: K, err: crate::Error) -> Self {
		self.failures.insert(key.into(), err);

		return self;
	}

	/// Get all calls made so far
	#[must_use]
	pub fn calls(&self) -> &[SimulatedCall] {
		return &self.calls;
	}

	/// Take the injected failure for `key`, if any
	fn take_failure(&mut self, key: &str) -> Result<(), crate::Error> {
		return match self.failures.remove(key) {
			Some(err) => Err(err),
			None => Ok(()),
		};
	}
}

impl VideoHost for SimulatedHost {
	fn name(&self) -> &'static str {
		return "simulated";
	}

	fn is_simulated(&self) -> bool {
		return true;
	}

	fn upload(&mut self, metadata: &VideoMetadata, media: &Path) -> Result<String, crate::Error> {
		self.calls
			.push(SimulatedCall::Upload(metadata.title.clone(), media.to_owned()));
		self.take_failure(&metadata.title)?;

		let id = format!("sim-{}", sanitize_title(&metadata.title));
		info!(
			"[dry-run] Would upload \"{}\" from \"{}\" as {} ({} tags), id {}",
			metadata.title,
			media.display(),
			metadata.visibility,
			metadata.tags.len(),
			id
		);

		return Ok(id);
	}

	fn fetch_snippet(&mut self, video_id: &str) -> Result<Snippet, crate::Error> {
		self.calls.push(SimulatedCall::FetchSnippet(video_id.to_owned()));
		self.take_failure(video_id)?;

		return Ok(self.snippets.get(video_id).cloned().unwrap_or_default());
	}

	fn update_snippet(&mut self, video_id: &str, snippet: &Snippet) -> Result<(), crate::Error> {
		self.calls.push(SimulatedCall::UpdateSnippet(
			video_id.to_owned(),
			snippet.description.clone(),
		));
		self.take_failure(video_id)?;

		info!(
			"[dry-run] Would update the description of {} ({} characters)",
			video_id,
			snippet.description.chars().count()
		);
		self.snippets.insert(video_id.to_owned(), snippet.clone());

		return Ok(());
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::data::row::Visibility;

	fn metadata(title: &str) -> VideoMetadata {
		return VideoMetadata {
			title:         title.to_owned(),
			description:   String::new(),
			tags:          Vec::new(),
			category_id:   None,
			visibility:    Visibility::Private,
			made_for_kids: false,
		};
	}

	#[test]
	fn test_upload_records_call() {
		let mut host = SimulatedHost::new();

		let id = host
			.upload(&metadata("A Title"), Path::new("/cache/A_Title.mp4"))
			.expect("Expected upload to work");

		assert_eq!("sim-A_Title", id);
		assert_eq!(
			&[SimulatedCall::Upload("A Title".to_owned(), PathBuf::from("/cache/A_Title.mp4"))],
			host.calls()
		);
	}

	#[test]
	fn test_injected_failure_once() {
		let mut host = SimulatedHost::new().with_failure("vid", crate::Error::quota_exhausted("quotaExceeded"));

		assert!(host.fetch_snippet("vid").is_err());
		assert!(host.fetch_snippet("vid").is_ok());
	}

	#[test]
	fn test_update_changes_snippet() {
		let mut host = SimulatedHost::new();
		let snippet = Snippet {
			description: "new".to_owned(),
			..Default::default()
		};

		host.update_snippet("vid", &snippet).expect("Expected update to work");

		assert_eq!("new", host.fetch_snippet("vid").unwrap().description);
	}
}
