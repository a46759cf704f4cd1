//! Module for the batch driver shared by both pipelines

use crate::data::{
	row::PendingRow,
	store::DatasetStore,
};

use super::{
	filter::filter_pending,
	progress::{
		MatchStrategy,
		ProgressRecorder,
		RecordOutcome,
		RowLocator,
	},
};

/// States of a batch run
///
/// `Idle -> Loading -> Iterating -> Acting -> Recording -> Iterating ... -> Done`,
/// `Acting -> StoppedEarly` once the hosting platform reports that the quota is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
	Idle,
	Loading,
	Iterating,
	Acting,
	Recording,
	Done,
	StoppedEarly,
}

/// Outcome of a successful [`RowAction::act`]
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
	/// The external action happened, the row has to be marked done
	/// values: (extra cells to write alongside the marker, as (column, value))
	Completed(Vec<(String, String)>),
	/// Nothing was done for this row and it is not marked, it will be tried again next run
	/// values: (reason)
	Skipped(String),
}

/// The per-row action of a pipeline
pub trait RowAction {
	/// Get the column that holds the progress marker of this pipeline
	fn marker_column(&self) -> &str;
	/// Get the column that holds the title of a row
	fn title_column(&self) -> &str;
	/// Get how a completed row is found again when recording
	fn match_strategy(&self) -> MatchStrategy;
	/// Perform the external action for `row`
	///
	/// `headers` are the headers of the dataset `row` was loaded from
	fn act(&mut self, headers: &[String], row: &PendingRow) -> Result<ActionOutcome, crate::Error>;
}

/// Final result of a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowResult {
	/// Action completed and the marker was written
	Recorded,
	/// Action completed, but the marker could not be written
	NotRecorded,
	/// values: (reason)
	Skipped(String),
	/// values: (error message)
	Failed(String),
}

/// Enum for progress reporting of [`run_batch`]
///
/// The order is always `Loaded -> (RowStarting -> RowFinished)* -> (StoppedEarly)? -> Finished`
#[derive(Debug, Clone, PartialEq)]
pub enum BatchProgress {
	/// Variant representing that the dataset was loaded and filtered
	/// values: (pending rows, all rows)
	Loaded(usize, usize),
	/// Variant representing that a row is about to be acted on
	/// values: (row index, label)
	RowStarting(usize, String),
	/// Variant representing that a row is done, in any way
	/// values: (row index, result)
	RowFinished(usize, RowResult),
	/// Variant representing that the batch stopped before all rows were done
	/// values: (row index that hit the stop, error message)
	StoppedEarly(usize, String),
	/// Variant representing that the batch is over
	Finished,
}

/// Summary of a batch run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
	/// Rows that were not done at the time of loading
	pub pending:      usize,
	/// Rows that completed and were marked
	pub recorded:     usize,
	/// Rows that completed but could not be marked
	pub not_recorded: usize,
	pub skipped:      usize,
	pub failed:       usize,
	/// Set if the batch stopped because of a exhausted quota
	pub stopped_at:   Option<usize>,
}

impl BatchReport {
	/// Get the state the batch ended in
	#[must_use]
	pub fn final_state(&self) -> BatchState {
		if self.stopped_at.is_some() {
			return BatchState::StoppedEarly;
		}

		return BatchState::Done;
	}
}

/// Log and apply a state transition
fn transition(state: &mut BatchState, next: BatchState) {
	trace!("Batch state {:?} -> {:?}", state, next);
	*state = next;
}

/// Run `action` for every pending row of the dataset in `store`, recording each completed row right away
///
/// Only errors while loading are returned, row errors are logged and counted in the [`BatchReport`].
/// A quota error stops the batch without marking the row.
pub fn run_batch<A: RowAction + ?Sized, F: FnMut(BatchProgress)>(
	store: &DatasetStore,
	action: &mut A,
	mut pgcb: F,
) -> Result<BatchReport, crate::Error> {
	let mut state = BatchState::Idle;
	let mut report = BatchReport::default();

	transition(&mut state, BatchState::Loading);
	let dataset = store.load()?;
	let pending = filter_pending(&dataset, action.marker_column());
	let headers = dataset.headers();
	report.pending = pending.len();

	info!(
		"{} of {} rows in \"{}\" are pending",
		pending.len(),
		dataset.len(),
		store.path().display()
	);
	pgcb(BatchProgress::Loaded(pending.len(), dataset.len()));

	let recorder = ProgressRecorder::new(store, action.marker_column(), action.title_column());
	let strategy = action.match_strategy();

	for row in &pending {
		transition(&mut state, BatchState::Iterating);
		let title = row.get_non_empty(headers, action.title_column());
		let label = title.map_or_else(|| return format!("<row {}>", row.index), |v| return v.to_owned());

		pgcb(BatchProgress::RowStarting(row.index, label.clone()));
		transition(&mut state, BatchState::Acting);

		let result = match action.act(headers, row) {
			Ok(ActionOutcome::Completed(extra)) => {
				transition(&mut state, BatchState::Recording);

				match RowLocator::for_row(strategy, title, row.index) {
					Some(locator) => match recorder.record_or_log(&locator, &extra) {
						Some(RecordOutcome::Recorded(_)) => RowResult::Recorded,
						Some(RecordOutcome::NotFound) | None => RowResult::NotRecorded,
					},
					None => {
						warn!("\"{}\" has no title to match by, progress not recorded", label);
						RowResult::NotRecorded
					},
				}
			},
			Ok(ActionOutcome::Skipped(reason)) => {
				info!("Skipping \"{}\": {}", label, reason);
				RowResult::Skipped(reason)
			},
			Err(err) if err.is_quota_exhausted() => {
				warn!("Quota exhausted at \"{}\", stopping: {}", label, err);
				transition(&mut state, BatchState::StoppedEarly);
				report.stopped_at = Some(row.index);
				pgcb(BatchProgress::StoppedEarly(row.index, err.to_string()));

				break;
			},
			Err(err) => {
				error!("Processing \"{}\" failed: {}", label, err);
				RowResult::Failed(err.to_string())
			},
		};

		match &result {
			RowResult::Recorded => {
				info!("Done with \"{}\"", label);
				report.recorded += 1;
			},
			RowResult::NotRecorded => report.not_recorded += 1,
			RowResult::Skipped(_) => report.skipped += 1,
			RowResult::Failed(_) => report.failed += 1,
		}

		pgcb(BatchProgress::RowFinished(row.index, result));
	}

	if state != BatchState::StoppedEarly {
		transition(&mut state, BatchState::Done);
	}
	pgcb(BatchProgress::Finished);

	return Ok(report);
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::*;
	use crate::data::{
		dataset::Dataset,
		store::test_utils::create_store,
	};

	/// What [`ScriptedAction`] does for a title
	enum Script {
		Complete,
		Skip,
		Fail,
		Quota,
	}

	/// Test action that behaves per title as scripted, everything not scripted completes
	struct ScriptedAction {
		strategy: MatchStrategy,
		script:   HashMap<&'static str, Script>,
		acted:    Vec<String>,
	}

	impl ScriptedAction {
		fn new(strategy: MatchStrategy, script: Vec<(&'static str, Script)>) -> Self {
			return Self {
				strategy,
				script: script.into_iter().collect(),
				acted: Vec::new(),
			};
		}
	}

	impl RowAction for ScriptedAction {
		fn marker_column(&self) -> &str {
			return "Uploaded";
		}

		fn title_column(&self) -> &str {
			return "Title";
		}

		fn match_strategy(&self) -> MatchStrategy {
			return self.strategy;
		}

		fn act(&mut self, headers: &[String], row: &PendingRow) -> Result<ActionOutcome, crate::Error> {
			let title = row.get_non_empty(headers, "Title").unwrap_or_default().to_owned();
			self.acted.push(title.clone());

			return match self.script.get(title.as_str()).unwrap_or(&Script::Complete) {
				Script::Complete => Ok(ActionOutcome::Completed(Vec::new())),
				Script::Skip => Ok(ActionOutcome::Skipped("missing media".to_owned())),
				Script::Fail => Err(crate::Error::host_api(500, "Backend Error")),
				Script::Quota => Err(crate::Error::host_api(
					403,
					"The request cannot be completed because you have exceeded your quota.",
				)),
			};
		}
	}

	/// Helper to run a batch and collect all progress events
	/// Get a copy of `dataset` with the first two data rows swapped, like a operator sorting the sheet would
	fn swap_first_rows(dataset: &Dataset) -> Dataset {
		let mut rows = dataset.rows().to_vec();
		rows.swap(0, 1);

		return Dataset::new(dataset.headers().to_vec(), rows);
	}

	fn run(store: &DatasetStore, action: &mut ScriptedAction) -> (BatchReport, Vec<BatchProgress>) {
		let mut events = Vec::new();
		let report = run_batch(store, action, |v| events.push(v)).expect("Expected the batch to run");

		return (report, events);
	}

	#[test]
	fn test_three_rows_end_to_end() {
		let (store, _tempdir, path) = create_store("Title,Uploaded\nA,\nB,yes\nC,\n");
		let mut action = ScriptedAction::new(MatchStrategy::Title, vec![("C", Script::Fail)]);

		let (report, events) = run(&store, &mut action);

		assert_eq!(vec!["A".to_owned(), "C".to_owned()], action.acted);
		assert_eq!(
			BatchReport {
				pending:      2,
				recorded:     1,
				not_recorded: 0,
				skipped:      0,
				failed:       1,
				stopped_at:   None,
			},
			report
		);
		assert_eq!(BatchState::Done, report.final_state());
		assert_eq!("Title,Uploaded\nA,yes\nB,yes\nC,\n", std::fs::read_to_string(&path).unwrap());
		assert_eq!(
			vec![
				BatchProgress::Loaded(2, 3),
				BatchProgress::RowStarting(0, "A".to_owned()),
				BatchProgress::RowFinished(0, RowResult::Recorded),
				BatchProgress::RowStarting(2, "C".to_owned()),
				BatchProgress::RowFinished(2, RowResult::Failed("HostApiError: status 500: Backend Error".to_owned())),
				BatchProgress::Finished,
			],
			events
		);
	}

	#[test]
	fn test_quota_stop() {
		let (store, _tempdir, path) = create_store("Title,Uploaded\nA,\nB,\nC,\n");
		let mut action = ScriptedAction::new(MatchStrategy::Title, vec![("B", Script::Quota)]);

		let (report, events) = run(&store, &mut action);

		// "C" is never attempted
		assert_eq!(vec!["A".to_owned(), "B".to_owned()], action.acted);
		assert_eq!(Some(1), report.stopped_at);
		assert_eq!(BatchState::StoppedEarly, report.final_state());
		assert_eq!(1, report.recorded);
		assert_eq!("Title,Uploaded\nA,yes\nB,\nC,\n", std::fs::read_to_string(&path).unwrap());
		assert!(matches!(events[events.len() - 2], BatchProgress::StoppedEarly(1, _)));
	}

	#[test]
	fn test_skipped_rows_stay_pending() {
		let (store, _tempdir, path) = create_store("Title\nA\nB\n");
		let mut action = ScriptedAction::new(MatchStrategy::Position, vec![("A", Script::Skip)]);

		let (report, _) = run(&store, &mut action);

		assert_eq!(1, report.skipped);
		assert_eq!(1, report.recorded);
		// the marker column is appended, the skipped row is only padded
		assert_eq!("Title,Uploaded\nA\nB,yes\n", std::fs::read_to_string(&path).unwrap());
	}

	#[test]
	fn test_rerun_is_idempotent() {
		let (store, _tempdir, _path) = create_store("Title,Uploaded\nA,\nB,\n");

		let mut first = ScriptedAction::new(MatchStrategy::Title, vec![("B", Script::Fail)]);
		run(&store, &mut first);

		let mut second = ScriptedAction::new(MatchStrategy::Title, Vec::new());
		let (report, _) = run(&store, &mut second);
		assert_eq!(vec!["B".to_owned()], second.acted);
		assert_eq!(1, report.recorded);

		let mut third = ScriptedAction::new(MatchStrategy::Title, Vec::new());
		let (report, _) = run(&store, &mut third);
		assert!(third.acted.is_empty());
		assert_eq!(0, report.pending);
	}

	/// Positional recording marks whatever row is at the position at recording time
	#[test]
	fn test_positional_reorder_marks_wrong_row() {
		/// Action that reorders the durable file while "uploading", like a operator sorting the sheet would
		struct ReorderingAction<'a> {
			store: &'a DatasetStore,
		}

		impl RowAction for ReorderingAction<'_> {
			fn marker_column(&self) -> &str {
				return "Uploaded";
			}

			fn title_column(&self) -> &str {
				return "Title";
			}

			fn match_strategy(&self) -> MatchStrategy {
				return MatchStrategy::Position;
			}

			fn act(&mut self, _headers: &[String], row: &PendingRow) -> Result<ActionOutcome, crate::Error> {
				if row.index == 0 {
					let dataset = self.store.load()?;
					self.store.save(&swap_first_rows(&dataset))?;
				}

				return Ok(ActionOutcome::Completed(Vec::new()));
			}
		}

		let (store, _tempdir, path) = create_store("Title,Uploaded\nA,\nB,yes\n");
		let mut action = ReorderingAction { store: &store };

		let report = run_batch(&store, &mut action, |_| {}).expect("Expected the batch to run");

		assert_eq!(1, report.recorded);
		// "A" was the row acted on, but "B" (now at position 0) got marked again and "A" is still pending
		assert_eq!("Title,Uploaded\nB,yes\nA,\n", std::fs::read_to_string(&path).unwrap());
	}

	#[test]
	fn test_title_matching_survives_reorder() {
		let (store, _tempdir, path) = create_store("Title,Uploaded\nA,\nB,yes\n");

		let dataset = store.load().unwrap();
		let pending = filter_pending(&dataset, "Uploaded");
		store.save(&swap_first_rows(&dataset)).unwrap();

		let recorder = ProgressRecorder::new(&store, "Uploaded", "Title");
		let locator = RowLocator::for_row(MatchStrategy::Title, Some("A"), pending[0].index).unwrap();
		recorder.record(&locator, &[]).expect("Expected record to work");

		assert_eq!("Title,Uploaded\nB,yes\nA,yes\n", std::fs::read_to_string(&path).unwrap());
	}

	#[test]
	fn test_load_error_is_fatal() {
		let (store, _tempdir, path) = create_store("");
		std::fs::remove_file(&path).unwrap();
		let mut action = ScriptedAction::new(MatchStrategy::Title, Vec::new());

		assert!(run_batch(&store, &mut action, |_| {}).is_err());
		assert!(action.acted.is_empty());
	}
}
