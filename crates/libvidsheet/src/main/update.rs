//! Module for the metadata-update pipeline: replace the description of already published videos

use crate::{
	data::row::PendingRow,
	error::ErrorInner,
	host::{
		VideoHost,
		video_id::extract_video_id,
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

/// [`RowAction`] replacing the description of the video a row points to
///
/// The current snippet is fetched first, and only written back if the description differs.
pub struct UpdateAction<'a> {
	host:    &'a mut dyn VideoHost,
	options: &'a dyn PipelineOptions,
}

impl<'a> UpdateAction<'a> {
	/// Create a new instance of [`UpdateAction`]
	pub fn new(host: &'a mut dyn VideoHost, options: &'a dyn PipelineOptions) -> Self {
		return Self { host, options };
	}
}

impl RowAction for UpdateAction<'_> {
	fn marker_column(&self) -> &str {
		return &self.options.columns().update_marker;
	}

	fn title_column(&self) -> &str {
		return &self.options.columns().title;
	}

	fn match_strategy(&self) -> MatchStrategy {
		return self.options.match_strategy();
	}

	fn act(&mut self, headers: &[String], row: &PendingRow) -> Result<ActionOutcome, crate::Error> {
		let columns = self.options.columns();

		let Some(url) = row.get_non_empty(headers, &columns.video_url) else {
			return Ok(ActionOutcome::Skipped(format!("no \"{}\"", columns.video_url)));
		};
		// the description is taken verbatim, only a whitespace-only one counts as missing
		let Some(description) = row
			.get(headers, &columns.description)
			.filter(|v| return !v.trim().is_empty())
		else {
			return Ok(ActionOutcome::Skipped(format!("no \"{}\"", columns.description)));
		};
		let Some(video_id) = extract_video_id(url) else {
			return Ok(ActionOutcome::Skipped(format!("no video id in \"{url}\"")));
		};

		let mut snippet = match self.host.fetch_snippet(&video_id) {
			Ok(v) => v,
			Err(err) if matches!(err.inner(), ErrorInner::InvalidIdentifier(_)) => {
				return Ok(ActionOutcome::Skipped(format!("unknown video id \"{video_id}\"")));
			},
			Err(err) => return Err(err),
		};

		if snippet.description == description {
			return Ok(ActionOutcome::Skipped("already up to date".to_owned()));
		}

		debug!(
			"Replacing description of {} ({} -> {} characters)",
			video_id,
			snippet.description.chars().count(),
			description.chars().count()
		);
		description.clone_into(&mut snippet.description);
		self.host.update_snippet(&video_id, &snippet)?;

		return Ok(ActionOutcome::Completed(Vec::new()));
	}
}
