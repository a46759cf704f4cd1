//! Module containing [`YoutubeApi`], the [`VideoHost`] talking to the YouTube Data API v3

use std::{
	fs::File,
	path::Path,
};

use reqwest::{
	blocking::{
		Body,
		Client,
		Response,
	},
	header::LOCATION,
};
use serde::Deserialize;

use super::{
	Snippet,
	VideoHost,
	VideoMetadata,
};
use crate::{
	auth::AuthorizationProvider,
	error::IOErrorToError,
};

/// Base URL for all non-upload requests
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
/// Base URL for media uploads
pub const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

/// Api error reasons that mean the quota for the day is used up
const QUOTA_REASONS: &[&str] = &["quotaExceeded", "dailyLimitExceeded"];

/// Error body as returned by the api
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
	error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
	#[serde(default)]
	message: String,
	#[serde(default)]
	errors:  Vec<ApiErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorReason {
	#[serde(default)]
	reason: String,
}

/// Response of a finished upload, only the id is used
#[derive(Debug, Deserialize)]
struct UploadedVideo {
	id: String,
}

/// Response of a "videos.list" request
#[derive(Debug, Deserialize)]
struct VideoList {
	#[serde(default)]
	items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
	snippet: Snippet,
}

/// Real [`VideoHost`], every call fetches a credential from the [`AuthorizationProvider`] first
pub struct YoutubeApi {
	client:      Client,
	auth:        Box<dyn AuthorizationProvider>,
	api_base:    String,
	upload_base: String,
}

impl YoutubeApi {
	/// Create a new instance of [`YoutubeApi`] using the public endpoints
	pub fn new(client: Client, auth: Box<dyn AuthorizationProvider>) -> Self {
		return Self {
			client,
			auth,
			api_base: DEFAULT_API_BASE.to_owned(),
			upload_base: DEFAULT_UPLOAD_BASE.to_owned(),
		};
	}

	/// Builder function to use different endpoints
	#[must_use]
	pub fn with_base_urls<A: Into<String>, U: Into<String>>(mut self, api_base: A, upload_base: U) -> Self {
		self.api_base = api_base.into();
		self.upload_base = upload_base.into();

		return self;
	}

	/// Get the current access token
	fn token(&mut self) -> Result<String, crate::Error> {
		return Ok(self.auth.credential()?.access_token);
	}
}

impl VideoHost for YoutubeApi {
	fn name(&self) -> &'static str {
		return "youtube";
	}

	fn upload(&mut self, metadata: &VideoMetadata, media: &Path) -> Result<String, crate::Error> {
		let token = self.token()?;
		let file = File::open(media).attach_path_err(media)?;
		let size = file.metadata().attach_path_err(media)?.len();

		let mut snippet = serde_json::json!({
			"title": metadata.title,
			"description": metadata.description,
			"tags": metadata.tags,
		});
		if let Some(category_id) = &metadata.category_id {
			snippet["categoryId"] = serde_json::Value::from(category_id.as_str());
		}
		let body = serde_json::json!({
			"snippet": snippet,
			"status": {
				"privacyStatus": metadata.visibility,
				"selfDeclaredMadeForKids": metadata.made_for_kids,
			},
		});

		// step 1: open a resumable upload session
		let session = check_response(
			self.client
				.post(format!("{}/videos", self.upload_base))
				.query(&[("uploadType", "resumable"), ("part", "snippet,status")])
				.bearer_auth(&token)
				.header("X-Upload-Content-Type", "video/*")
				.header("X-Upload-Content-Length", size.to_string())
				.json(&body)
				.send()?,
		)?;

		let location = session
			.headers()
			.get(LOCATION)
			.and_then(|v| return v.to_str().ok())
			.ok_or_else(|| return crate::Error::host_api(session.status().as_u16(), "Upload session has no location"))?
			.to_owned();
		trace!("Upload session for \"{}\" at \"{}\"", metadata.title, location);

		// step 2: send the whole file into the session
		let uploaded: UploadedVideo = check_response(
			self.client
				.put(&location)
				.bearer_auth(&token)
				.header("Content-Type", "video/*")
				.body(Body::sized(file, size))
				.send()?,
		)?
		.json()?;

		debug!("Uploaded \"{}\" ({} bytes) as {}", metadata.title, size, uploaded.id);

		return Ok(uploaded.id);
	}

	fn fetch_snippet(&mut self, video_id: &str) -> Result<Snippet, crate::Error> {
		let token = self.token()?;

		let list: VideoList = check_response(
			self.client
				.get(format!("{}/videos", self.api_base))
				.query(&[("part", "snippet"), ("id", video_id)])
				.bearer_auth(&token)
				.send()?,
		)?
		.json()?;

		return list
			.items
			.into_iter()
			.next()
			.map(|v| return v.snippet)
			.ok_or_else(|| return crate::Error::invalid_identifier(format!("No video with id \"{video_id}\"")));
	}

	fn update_snippet(&mut self, video_id: &str, snippet: &Snippet) -> Result<(), crate::Error> {
		let token = self.token()?;

		check_response(
			self.client
				.put(format!("{}/videos", self.api_base))
				.query(&[("part", "snippet")])
				.bearer_auth(&token)
				.json(&serde_json::json!({
					"id": video_id,
					"snippet": snippet,
				}))
				.send()?,
		)?;

		return Ok(());
	}
}

/// Return the response if it is a success, otherwise convert the error body with [`api_error`]
fn check_response(response: Response) -> Result<Response, crate::Error> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().unwrap_or_default();

	return Err(api_error(status.as_u16(), &body));
}

/// Convert a unsuccessful api response to a [`crate::Error`]
///
/// Quota reasons become [`crate::error::ErrorInner::QuotaExhausted`], everything else [`crate::error::ErrorInner::HostApi`]
pub fn api_error(status: u16, body: &str) -> crate::Error {
	let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) else {
		return crate::Error::host_api(status, body.trim());
	};

	let detail = parsed.error;

	if detail
		.errors
		.iter()
		.any(|v| return QUOTA_REASONS.contains(&v.reason.as_str()))
	{
		return crate::Error::quota_exhausted(detail.message);
	}

	return crate::Error::host_api(status, detail.message);
}
