//! Module for the publish pipeline: acquire the media of a row and upload it as a new video

use crate::{
	data::row::{
		PendingRow,
		VideoRow,
	},
	fetch::media::MediaAcquirer,
	host::{
		VideoHost,
		VideoMetadata,
		video_url,
	},
	traits::pipeline_options::PipelineOptions,
};

use super::{
	batch::{
		ActionOutcome,
		RowAction,
	},
	progress::MatchStrategy,
};

/// [`RowAction`] uploading every pending row as a new video
///
/// On success the published video URL is written into the video URL column together with the marker.
pub struct PublishAction<'a> {
	host:    &'a mut dyn VideoHost,
	media:   &'a MediaAcquirer,
	options: &'a dyn PipelineOptions,
}

impl<'a> PublishAction<'a> {
	/// Create a new instance of [`PublishAction`]
	pub fn new(host: &'a mut dyn VideoHost, media: &'a MediaAcquirer, options: &'a dyn PipelineOptions) -> Self {
		return Self { host, media, options };
	}

	/// Build the metadata to upload with, applying the configured defaults
	fn metadata(&self, title: &str, video: VideoRow) -> VideoMetadata {
		return VideoMetadata {
			title:         title.to_owned(),
			description:   video.description.unwrap_or_default(),
			tags:          video.tags,
			category_id:   video
				.category_id
				.or_else(|| return self.options.default_category_id().map(|v| return v.to_owned())),
			visibility:    video.visibility.unwrap_or_else(|| return self.options.default_visibility()),
			made_for_kids: video.made_for_kids,
		};
	}
}

impl RowAction for PublishAction<'_> {
	fn marker_column(&self) -> &str {
		return &self.options.columns().publish_marker;
	}

	fn title_column(&self) -> &str {
		return &self.options.columns().title;
	}

	fn match_strategy(&self) -> MatchStrategy {
		return self.options.match_strategy();
	}

	fn act(&mut self, headers: &[String], row: &PendingRow) -> Result<ActionOutcome, crate::Error> {
		let columns = self.options.columns();
		let mut video = VideoRow::from_pending(headers, row, columns);

		let Some(title) = video.title.take() else {
			return Ok(ActionOutcome::Skipped(format!("no \"{}\"", columns.title)));
		};
		let Some(media_url) = video.media_url.take() else {
			return Ok(ActionOutcome::Skipped(format!("no \"{}\"", columns.media_url)));
		};

		let media = self.media.acquire(&title, &media_url)?;
		let metadata = self.metadata(&title, video);

		info!("Uploading \"{}\" to {}", title, self.host.name());
		let id = self.host.upload(&metadata, &media)?;

		// a made up id would look like a real video to the update pipeline
		if self.host.is_simulated() {
			debug!("Not recording the url of simulated id {}", id);
			return Ok(ActionOutcome::Completed(Vec::new()));
		}

		return Ok(ActionOutcome::Completed(vec![(columns.video_url.clone(), video_url(&id))]));
	}
}

#[cfg(test)]
mod test {
	use std::path::Path;

	use super::*;
	use crate::{
		data::{
			row::{
				ColumnNames,
				Visibility,
			},
			store::test_utils::create_store,
		},
		host::{
			Snippet,
			simulated::{
				SimulatedCall,
				SimulatedHost,
			},
		},
		main::batch::run_batch,
	};
	use reqwest::blocking::Client;
	use tempfile::Builder as TempBuilder;

	/// Options for tests
	struct TestOptions {
		columns:  ColumnNames,
		strategy: MatchStrategy,
	}

	impl PipelineOptions for TestOptions {
		fn columns(&self) -> &ColumnNames {
			return &self.columns;
		}

		fn match_strategy(&self) -> MatchStrategy {
			return self.strategy;
		}

		fn default_visibility(&self) -> Visibility {
			return Visibility::Unlisted;
		}

		fn default_category_id(&self) -> Option<&str> {
			return Some("22");
		}
	}

	fn options() -> TestOptions {
		return TestOptions {
			columns:  ColumnNames::default(),
			strategy: MatchStrategy::Title,
		};
	}

	#[test]
	fn test_metadata_defaults() {
		let options = options();
		let cache = MediaAcquirer::new("/cache", Client::new());
		let mut host = SimulatedHost::new();
		let action = PublishAction::new(&mut host, &cache, &options);

		let headers: Vec<String> = vec!["Title".to_owned(), "Privacy".to_owned(), "Category".to_owned()];
		let row = PendingRow::new(0, vec!["A".to_owned(), "public".to_owned(), String::new()]);

		let metadata = action.metadata("A", VideoRow::from_pending(&headers, &row, options.columns()));

		assert_eq!(Visibility::Public, metadata.visibility);
		assert_eq!(Some("22".to_owned()), metadata.category_id);
		assert_eq!("", metadata.description);
	}

	/// Host returning fixed ids for uploads, like the real platform would
	struct FixedIdHost {
		uploads: Vec<String>,
	}

	impl VideoHost for FixedIdHost {
		fn name(&self) -> &'static str {
			return "fixed";
		}

		fn upload(&mut self, metadata: &VideoMetadata, _media: &Path) -> Result<String, crate::Error> {
			self.uploads.push(metadata.title.clone());

			return Ok("dQw4w9WgXcQ".to_owned());
		}

		fn fetch_snippet(&mut self, video_id: &str) -> Result<Snippet, crate::Error> {
			return Err(crate::Error::invalid_identifier(video_id));
		}

		fn update_snippet(&mut self, video_id: &str, _snippet: &Snippet) -> Result<(), crate::Error> {
			return Err(crate::Error::invalid_identifier(video_id));
		}
	}

	#[test]
	fn test_publish_writes_url() {
		let (store, tempdir, path) = create_store("Title,Media URL
First Video,http://127.0.0.1:9/a.mp4
");
		let cache_dir = tempdir.path().join("media");
		std::fs::create_dir_all(&cache_dir).unwrap();
		std::fs::write(cache_dir.join("First_Video.mp4"), b"data").unwrap();

		let options = options();
		let cache = MediaAcquirer::new(&cache_dir, Client::new());
		let mut host = FixedIdHost { uploads: Vec::new() };

		let report = {
			let mut action = PublishAction::new(&mut host, &cache, &options);
			run_batch(&store, &mut action, |_| {}).expect("Expected the batch to run")
		};

		assert_eq!(1, report.recorded);
		assert_eq!(vec!["First Video".to_owned()], host.uploads);
		assert_eq!(
			"Title,Media URL,Uploaded,YouTube URL\nFirst Video,http://127.0.0.1:9/a.mp4,yes,https://youtu.be/dQw4w9WgXcQ\n",
			std::fs::read_to_string(&path).unwrap()
		);
	}

	#[test]
	fn test_dry_run_publish_from_cache() {
		let (store, tempdir, path) = create_store(
			"Title,Media URL,Description,Uploaded\nFirst Video,http://127.0.0.1:9/a.mp4,Desc,\nNo Media,,Desc,\nDone,http://127.0.0.1:9/c.mp4,,yes\n",
		);
		// media is already cached, the unreachable url is never requested
		let cache_dir = tempdir.path().join("media");
		std::fs::create_dir_all(&cache_dir).unwrap();
		std::fs::write(cache_dir.join("First_Video.mp4"), b"data").unwrap();

		let options = options();
		let cache = MediaAcquirer::new(&cache_dir, Client::new());
		let mut host = SimulatedHost::new();

		let report = {
			let mut action = PublishAction::new(&mut host, &cache, &options);
			run_batch(&store, &mut action, |_| {}).expect("Expected the batch to run")
		};

		assert_eq!(1, report.recorded);
		assert_eq!(1, report.skipped);
		assert_eq!(
			&[SimulatedCall::Upload("First Video".to_owned(), cache_dir.join("First_Video.mp4"))],
			host.calls()
		);
		assert_eq!(
			"Title,Media URL,Description,Uploaded\nFirst Video,http://127.0.0.1:9/a.mp4,Desc,yes\nNo Media,,Desc,\nDone,http://127.0.0.1:9/c.mp4,,yes\n",
			std::fs::read_to_string(&path).unwrap()
		);
	}

	#[test]
	fn test_failed_media_is_not_marked() {
		let (store, _tempdir, path) = create_store("Title,Media URL\nA,http://127.0.0.1:9/a.mp4\n");
		let cache_dir = TempBuilder::new()
			.prefix("vidsheet-test-publish-")
			.tempdir()
			.expect("Expected a temp dir to be created");

		let options = options();
		let cache = MediaAcquirer::new(cache_dir.path(), Client::new());
		let mut host = SimulatedHost::new();

		let report = {
			let mut action = PublishAction::new(&mut host, &cache, &options);
			run_batch(&store, &mut action, |_| {}).expect("Expected the batch to run")
		};

		assert_eq!(1, report.failed);
		assert!(host.calls().is_empty());
		assert_eq!("Title,Media URL\nA,http://127.0.0.1:9/a.mp4\n", std::fs::read_to_string(&path).unwrap());
	}
}
