//! Module for selecting the rows that still have to be processed

use crate::data::{
	dataset::Dataset,
	row::{
		PendingRow,
		is_done_marker,
	},
};

/// Get all rows of `dataset` whose `marker_column` cell is not a done marker, in dataset order
///
/// A missing marker column or a row too short to have the cell counts as "not done".
/// Every returned row keeps its position in `dataset`.
#[must_use]
pub fn filter_pending(dataset: &Dataset, marker_column: &str) -> Vec<PendingRow> {
	let marker_index = dataset.find_column(marker_column);

	return dataset
		.rows()
		.iter()
		.enumerate()
		.filter(|(_, cells)| {
			let marker = marker_index.and_then(|i| return cells.get(i)).map(|v| return v.as_str());

			return !is_done_marker(marker);
		})
		.map(|(index, cells)| return PendingRow::new(index, cells.clone()))
		.collect();
}
