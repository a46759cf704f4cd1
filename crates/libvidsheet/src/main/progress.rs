//! Module for recording the progress of a row into the durable store

use crate::{
	data::{
		dataset::Dataset,
		row::DONE_MARKER,
		store::DatasetStore,
	},
	utils::normalize_cell,
};

/// How the row to mark is found again in the freshly loaded durable dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
	/// Match the first row with the same (trimmed) title
	#[default]
	Title,
	/// Match the row at the same position
	///
	/// Only correct as long as the durable file is not reordered between loading and recording,
	/// prefer [`MatchStrategy::Title`]
	Position,
}

impl MatchStrategy {
	/// Get current [`MatchStrategy`] as a str
	pub fn to_str(&self) -> &'static str {
		return match self {
			MatchStrategy::Title => "title",
			MatchStrategy::Position => "position",
		};
	}

	/// Try to convert a String-like to a [`MatchStrategy`]
	/// Input will be trimmed and lowercased for matching
	pub fn try_from_str<I: AsRef<str>>(input: I) -> Option<Self> {
		return match normalize_cell(input).as_str() {
			"title" => Some(Self::Title),
			"position" | "index" => Some(Self::Position),
			_ => None,
		};
	}
}

impl std::fmt::Display for MatchStrategy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return write!(f, "{}", self.to_str());
	}
}

/// Identity of a row to find again in the durable dataset
#[derive(Debug, Clone, PartialEq)]
pub enum RowLocator {
	/// Natural key: the row title
	Title(String),
	/// Zero-based data row position (header excluded)
	Position(usize),
}

impl RowLocator {
	/// Build the locator for a row by `strategy`
	///
	/// Returns [None] for [`MatchStrategy::Title`] if the row has no title
	#[must_use]
	pub fn for_row(strategy: MatchStrategy, title: Option<&str>, index: usize) -> Option<Self> {
		return match strategy {
			MatchStrategy::Title => title.map(|v| return Self::Title(v.trim().to_owned())),
			MatchStrategy::Position => Some(Self::Position(index)),
		};
	}
}

impl std::fmt::Display for RowLocator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return match self {
			RowLocator::Title(title) => write!(f, "title \"{title}\""),
			RowLocator::Position(index) => write!(f, "row {index}"),
		};
	}
}

/// Result of a successful [`ProgressRecorder::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
	/// The marker was written to the row at this position
	Recorded(usize),
	/// No row matched, nothing was written
	NotFound,
}

/// Find the first row whose `title_column` cell equals `title` (both trimmed, case-sensitive)
#[must_use]
pub fn locate_by_title(dataset: &Dataset, title_column: &str, title: &str) -> Option<usize> {
	let column = dataset.find_column(title_column)?;
	let title = title.trim();

	return dataset
		.rows()
		.iter()
		.position(|row| return row.get(column).is_some_and(|v| return v.trim() == title));
}

/// Check that a row exists at `index`
#[must_use]
pub fn locate_by_position(dataset: &Dataset, index: usize) -> Option<usize> {
	if index < dataset.len() {
		return Some(index);
	}

	return None;
}

/// Writes the done marker of a row into the durable store
///
/// Every call re-reads the durable store, so progress written by earlier calls (or other edits of the file) is not overwritten.
#[derive(Debug)]
pub struct ProgressRecorder<'a> {
	store:         &'a DatasetStore,
	/// Column that holds the progress marker
	marker_column: String,
	/// Column used for [`RowLocator::Title`]
	title_column:  String,
}

impl<'a> ProgressRecorder<'a> {
	/// Create a new instance of [`ProgressRecorder`]
	pub fn new<M: Into<String>, T: Into<String>>(store: &'a DatasetStore, marker_column: M, title_column: T) -> Self {
		return Self {
			store,
			marker_column: marker_column.into(),
			title_column: title_column.into(),
		};
	}

	/// Mark the row identified by `locator` as done, also setting all `extra` cells (column name, value) in the same write
	///
	/// Steps: load the durable dataset, locate the row, resolve the marker column (appending it if missing),
	/// set the marker (padding the row if needed), rewrite the durable store.
	/// If no row matches, nothing is written and [`RecordOutcome::NotFound`] is returned.
	pub fn record(&self, locator: &RowLocator, extra: &[(String, String)]) -> Result<RecordOutcome, crate::Error> {
		let mut dataset = self.store.load()?;

		let found = match locator {
			RowLocator::Title(title) => locate_by_title(&dataset, &self.title_column, title),
			RowLocator::Position(index) => locate_by_position(&dataset, *index),
		};

		let Some(row) = found else {
			warn!(
				"Could not find {} in \"{}\", progress not recorded",
				locator,
				self.store.path().display()
			);
			return Ok(RecordOutcome::NotFound);
		};

		let marker = dataset.resolve_column(&self.marker_column);
		dataset.set_cell(row, marker, DONE_MARKER);

		for (column, value) in extra {
			let index = dataset.resolve_column(column);
			dataset.set_cell(row, index, value.as_str());
		}

		self.store.save(&dataset)?;
		debug!("Recorded progress for {} (row {})", locator, row);

		return Ok(RecordOutcome::Recorded(row));
	}

	/// Same as [`Self::record`], but errors are only logged
	///
	/// A failed record is not fatal for a batch, the row will just be processed again on the next run
	pub fn record_or_log(&self, locator: &RowLocator, extra: &[(String, String)]) -> Option<RecordOutcome> {
		return match self.record(locator, extra) {
			Ok(v) => Some(v),
			Err(err) => {
				error!("Failed to record progress for {}: {}", locator, err);
				None
			},
		};
	}
}
