//! Module for extracting the platform video id from a stored URL

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Regex matching a complete video id
static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	return Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Expected VIDEO_ID_REGEX to be valid");
});

/// Path segments after which the next segment is the video id, like "/shorts/<id>"
const ID_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

/// Try to extract the video id from `input`
///
/// Supported forms:
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/watch?v=<id>` (also "m." and "music." hosts)
/// - `https://www.youtube.com/shorts/<id>`, `/embed/<id>`, `/live/<id>`, `/v/<id>`
/// - a bare id
#[must_use]
pub fn extract_video_id(input: &str) -> Option<String> {
	let input = input.trim();

	if VIDEO_ID_REGEX.is_match(input) {
		return Some(input.to_owned());
	}

	let url = Url::parse(input)
		.or_else(|_| return Url::parse(&format!("https://{input}")))
		.ok()?;

	let host = url.host_str()?.trim_start_matches("www.").to_lowercase();

	let candidate = if host == "youtu.be" {
		url.path_segments()?.next().map(|v| return v.to_owned())
	} else if host == "youtube.com" || host.ends_with(".youtube.com") || host == "youtube-nocookie.com" {
		id_from_youtube_url(&url)
	} else {
		None
	}?;

	if VIDEO_ID_REGEX.is_match(&candidate) {
		return Some(candidate);
	}

	return None;
}

/// Helper for [`extract_video_id`] to get the id candidate from a full youtube url
fn id_from_youtube_url(url: &Url) -> Option<String> {
	if let Some((_, v)) = url.query_pairs().find(|(k, _)| return k == "v") {
		return Some(v.into_owned());
	}

	let mut segments = url.path_segments()?;

	while let Some(segment) = segments.next() {
		if ID_PATH_PREFIXES.contains(&segment) {
			return segments.next().map(|v| return v.to_owned());
		}
	}

	return None;
}
