//! Module for the options a pipeline run is configured with

use crate::{
	data::row::{
		ColumnNames,
		Visibility,
	},
	main::progress::MatchStrategy,
};

/// Options for [`crate::main::publish::PublishAction`] and [`crate::main::update::UpdateAction`]
///
/// Implemented once per run by the caller and passed to every component, instead of any global state
pub trait PipelineOptions {
	/// Get the column names to read and write
	fn columns(&self) -> &ColumnNames;
	/// Get how the progress recorder finds the row to mark in the freshly loaded dataset
	fn match_strategy(&self) -> MatchStrategy;
	/// Get the visibility to publish with when a row does not define a (valid) one
	fn default_visibility(&self) -> Visibility;
	/// Get the category id to publish with when a row does not define one
	/// [None] lets the hosting platform decide
	fn default_category_id(&self) -> Option<&str>;
}
