//! Module containing the Row views ([`PendingRow`], [`VideoRow`]) and the column naming

use crate::utils::{
	non_empty,
	normalize_cell,
};

use super::dataset::find_column;

/// The canonical value written into a progress marker cell once a row is done
pub const DONE_MARKER: &str = "yes";

/// Get if the given marker cell value means "already processed"
///
/// Only a (trimmed, case-insensitive) "yes" counts as done, a missing cell does not.
#[must_use]
pub fn is_done_marker(value: Option<&str>) -> bool {
	return value.is_some_and(|v| return normalize_cell(v) == DONE_MARKER);
}

/// The names of the columns the pipelines read and write
///
/// All lookups are case-insensitive and trimmed, see [`crate::data::dataset::find_column`]
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNames {
	/// Human title of the video, also the natural key of a row
	pub title:          String,
	/// Location of the source media to upload
	pub media_url:      String,
	/// Location of the published video on the hosting platform
	pub video_url:      String,
	pub description:    String,
	/// Comma separated tags
	pub tags:           String,
	/// Platform category id
	pub category:       String,
	/// "public", "unlisted" or "private"
	pub visibility:     String,
	/// Audience flag, "yes" / "true" / "1" mean made for kids
	pub made_for_kids:  String,
	/// Progress marker of the publish pipeline
	pub publish_marker: String,
	/// Progress marker of the metadata-update pipeline
	pub update_marker:  String,
}

impl Default for ColumnNames {
	fn default() -> Self {
		return Self {
			title:          "Title".to_owned(),
			media_url:      "Media URL".to_owned(),
			video_url:      "YouTube URL".to_owned(),
			description:    "Description".to_owned(),
			tags:           "Tags".to_owned(),
			category:       "Category".to_owned(),
			visibility:     "Privacy".to_owned(),
			made_for_kids:  "Made For Kids".to_owned(),
			publish_marker: "Uploaded".to_owned(),
			update_marker:  "updated_description".to_owned(),
		};
	}
}

/// A row that still has to be processed, together with its position in the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRow {
	/// Zero-based position of the row in the dataset (header excluded)
	pub index: usize,
	/// The raw cells of the row
	pub cells: Vec<String>,
}

impl PendingRow {
	/// Create a new instance of [`PendingRow`]
	pub fn new(index: usize, cells: Vec<String>) -> Self {
		return Self { index, cells };
	}

	/// Get the raw cell of the column named `column`
	#[must_use]
	pub fn get<'a>(&'a self, headers: &[String], column: &str) -> Option<&'a str> {
		let index = find_column(headers, column)?;

		return self.cells.get(index).map(|v| return v.as_str());
	}

	/// Get the trimmed cell of the column named `column`, [None] if missing or empty
	#[must_use]
	pub fn get_non_empty<'a>(&'a self, headers: &[String], column: &str) -> Option<&'a str> {
		return self.get(headers, column).and_then(non_empty);
	}
}

/// Visibility of a published video
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum Visibility {
	Public,
	Unlisted,
	#[default]
	Private,
}

impl Visibility {
	/// Get current [`Visibility`] as a str, in the form the hosting platform expects it
	pub fn to_str(&self) -> &'static str {
		return match self {
			Visibility::Public => "public",
			Visibility::Unlisted => "unlisted",
			Visibility::Private => "private",
		};
	}

	/// Try to convert a String-like to a [`Visibility`]
	/// Input will be trimmed and lowercased for matching
	pub fn try_from_str<I: AsRef<str>>(input: I) -> Option<Self> {
		return match normalize_cell(input).as_str() {
			"public" => Some(Self::Public),
			"unlisted" => Some(Self::Unlisted),
			"private" => Some(Self::Private),
			_ => None,
		};
	}
}

// Implement Casting Self as str
impl AsRef<str> for Visibility {
	fn as_ref(&self) -> &str {
		return self.to_str();
	}
}

// Implement Display for ease-of-use
impl std::fmt::Display for Visibility {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return write!(f, "{}", self.to_str());
	}
}

// Implement custom Serialize because otherwise serde would use the variant names instead of the platform names
impl serde::Serialize for Visibility {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		return serializer.serialize_str(self.to_str());
	}
}

// Implement custom Deserialize because otherwise serde would look-up the variant names instead of the platform names
impl<'de> serde::Deserialize<'de> for Visibility {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		struct VisibilityVisitor;

		impl serde::de::Visitor<'_> for VisibilityVisitor {
			type Value = Visibility;

			fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
				return Visibility::try_from_str(v)
					.ok_or_else(|| return E::custom(format!("unknown visibility \"{v}\"")));
			}

			fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
				write!(formatter, "one of \"public\", \"unlisted\" or \"private\"")?;

				return Ok(());
			}
		}

		return deserializer.deserialize_str(VisibilityVisitor);
	}
}

/// Typed view of a [`PendingRow`] with all fields the pipelines need
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRow {
	/// Zero-based position of the row in the dataset (header excluded)
	pub index:         usize,
	pub title:         Option<String>,
	pub media_url:     Option<String>,
	pub video_url:     Option<String>,
	pub description:   Option<String>,
	pub tags:          Vec<String>,
	pub category_id:   Option<String>,
	/// [None] when the cell is empty or not a known visibility
	pub visibility:    Option<Visibility>,
	pub made_for_kids: bool,
}

impl VideoRow {
	/// Extract all known fields of `row` by using the column names in `columns`
	pub fn from_pending(headers: &[String], row: &PendingRow, columns: &ColumnNames) -> Self {
		let owned = |column: &str| return row.get_non_empty(headers, column).map(|v| return v.to_owned());

		let visibility = row.get_non_empty(headers, &columns.visibility).and_then(|v| {
			let parsed = Visibility::try_from_str(v);

			if parsed.is_none() {
				warn!("Row {}: unknown visibility \"{}\", using the default", row.index, v);
			}

			return parsed;
		});

		return Self {
			index: row.index,
			title: owned(&columns.title),
			media_url: owned(&columns.media_url),
			video_url: owned(&columns.video_url),
			// the description is kept verbatim (only checked to be non-empty), because leading whitespace could be wanted
			description: row
				.get(headers, &columns.description)
				.filter(|v| return non_empty(*v).is_some())
				.map(|v| return v.to_owned()),
			tags: row
				.get(headers, &columns.tags)
				.map(split_tags)
				.unwrap_or_default(),
			category_id: owned(&columns.category),
			visibility,
			made_for_kids: row
				.get(headers, &columns.made_for_kids)
				.is_some_and(parse_flag),
		};
	}

	/// Get a label to identify this row in logs and progress output
	#[must_use]
	pub fn label(&self) -> String {
		return match &self.title {
			Some(title) => title.clone(),
			None => format!("<row {}>", self.index),
		};
	}
}

/// Split a comma separated tag cell into trimmed, non-empty tags
fn split_tags(value: &str) -> Vec<String> {
	return value
		.split(',')
		.filter_map(|v| return non_empty(v))
		.map(|v| return v.to_owned())
		.collect();
}

/// Parse a boolean-like flag cell
fn parse_flag(value: &str) -> bool {
	return matches!(normalize_cell(value).as_str(), "yes" | "true" | "1" | "y");
}
