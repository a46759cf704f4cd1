//! Module for State Struct for all commands

use libvidsheet::{
	data::row::{
		ColumnNames,
		Visibility,
	},
	main::progress::MatchStrategy,
	traits::pipeline_options::PipelineOptions,
};

/// Struct to keep configuration data for the [`PipelineOptions`] trait
///
/// Built once per pipeline run from the cli arguments
#[derive(Debug, PartialEq, Clone)]
pub struct RunState {
	/// Names of all columns read and written
	columns:             ColumnNames,
	/// How completed rows are found again
	match_strategy:      MatchStrategy,
	/// Visibility for rows without a valid one
	default_visibility:  Visibility,
	/// Category for rows without one
	default_category_id: Option<String>,
}

impl RunState {
	/// Create a new instance of [`RunState`] with the required options
	pub fn new(columns: ColumnNames, match_strategy: MatchStrategy) -> Self {
		return Self {
			columns,
			match_strategy,
			default_visibility: Visibility::default(),
			default_category_id: None,
		};
	}

	/// Builder function to set the defaults used when publishing
	#[must_use]
	pub fn with_publish_defaults(mut self, visibility: Visibility, category_id: Option<String>) -> Self {
		self.default_visibility = visibility;
		self.default_category_id = category_id.filter(|v| return !v.trim().is_empty());

		return self;
	}
}

impl PipelineOptions for RunState {
	fn columns(&self) -> &ColumnNames {
		return &self.columns;
	}

	fn match_strategy(&self) -> MatchStrategy {
		return self.match_strategy;
	}

	fn default_visibility(&self) -> Visibility {
		return self.default_visibility;
	}

	fn default_category_id(&self) -> Option<&str> {
		return self.default_category_id.as_deref();
	}
}
