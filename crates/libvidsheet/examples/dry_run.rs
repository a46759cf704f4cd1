use libvidsheet::{
	data::{
		row::{
			ColumnNames,
			Visibility,
		},
		store::DatasetStore,
	},
	host::simulated::SimulatedHost,
	main::{
		batch::{
			BatchProgress,
			RowResult,
			run_batch,
		},
		progress::MatchStrategy,
		update::UpdateAction,
	},
	traits::pipeline_options::PipelineOptions,
};

struct Options {
	columns: ColumnNames,
}

impl PipelineOptions for Options {
	fn columns(&self) -> &ColumnNames {
		return &self.columns;
	}

	fn match_strategy(&self) -> MatchStrategy {
		return MatchStrategy::Title;
	}

	fn default_visibility(&self) -> Visibility {
		return Visibility::Private;
	}

	fn default_category_id(&self) -> Option<&str> {
		return None;
	}
}

fn progress_callback(event: BatchProgress) {
	match event {
		BatchProgress::Loaded(pending, all) => println!("{pending} of {all} rows pending"),
		BatchProgress::RowStarting(index, label) => println!("Starting row {index}: {label}"),
		BatchProgress::RowFinished(index, RowResult::Skipped(reason)) => println!("Skipped row {index}: {reason}"),
		BatchProgress::RowFinished(index, result) => println!("Finished row {index}: {result:?}"),
		BatchProgress::StoppedEarly(index, msg) => println!("Stopped at row {index}: {msg}"),
		BatchProgress::Finished => println!("Finished"),
	}
}

fn main() -> Result<(), libvidsheet::Error> {
	let mut args = std::env::args();

	let _ = args.next();

	let path = args.next().expect("Expected a dataset path as a argument");

	let store = DatasetStore::new(path);
	let options = Options {
		columns: ColumnNames::default(),
	};
	// every snippet starts with a empty description, so every row with a description gets "updated"
	let mut host = SimulatedHost::new();
	let mut action = UpdateAction::new(&mut host, &options);

	let report = run_batch(&store, &mut action, progress_callback)?;

	println!("Report: {report:#?}");

	return Ok(());
}
