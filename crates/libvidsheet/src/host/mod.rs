//! Module for the video hosting platform the pipelines act on

use std::path::Path;

use serde::{
	Deserialize,
	Serialize,
};

use crate::data::row::Visibility;

pub mod api;
pub mod simulated;
pub mod video_id;

/// Everything needed to create a new video on the hosting platform
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
	pub title:         String,
	pub description:   String,
	pub tags:          Vec<String>,
	/// [None] lets the platform use its default category
	pub category_id:   Option<String>,
	pub visibility:    Visibility,
	pub made_for_kids: bool,
}

/// The editable metadata block of a existing video
///
/// The platform only accepts whole snippets on update, so all fields not modelled here are kept in `other`
/// and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
	#[serde(default)]
	pub title:       String,
	#[serde(default)]
	pub description: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tags:        Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category_id: Option<String>,
	/// All other fields, as returned by the platform
	#[serde(flatten)]
	pub other:       serde_json::Map<String, serde_json::Value>,
}

/// The actions the pipelines perform on the hosting platform
///
/// Implemented by [`api::YoutubeApi`] for the real platform and by [`simulated::SimulatedHost`] for dry-runs,
/// which one is used is decided once at startup.
pub trait VideoHost {
	/// Get a short name of this host for logging
	fn name(&self) -> &'static str;
	/// Create a new video from `metadata` and the local file `media`, returns the platform id of the new video
	fn upload(&mut self, metadata: &VideoMetadata, media: &Path) -> Result<String, crate::Error>;
	/// Get the current snippet of the video `video_id`
	fn fetch_snippet(&mut self, video_id: &str) -> Result<Snippet, crate::Error>;
	/// Replace the snippet of the video `video_id` with `snippet`
	fn update_snippet(&mut self, video_id: &str, snippet: &Snippet) -> Result<(), crate::Error>;
	/// Get whether the ids returned by this host are made up and do not exist on the platform
	fn is_simulated(&self) -> bool {
		return false;
	}
}

/// Get the public short URL for a video id
#[must_use]
pub fn video_url(video_id: &str) -> String {
	return format!("https://youtu.be/{video_id}");
}
