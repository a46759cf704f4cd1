//! Module for all (longer) commands

use std::sync::LazyLock;

use colored::{
	Color,
	Colorize,
};
use indicatif::{
	ProgressBar,
	ProgressStyle,
};
use libvidsheet::{
	data::store::DatasetStore,
	main::batch::{
		BatchProgress,
		BatchReport,
		RowAction,
		RowResult,
		run_batch,
	},
};

use crate::{
	clap_conf::CliDerive,
	utils,
};

pub mod auth;
pub mod completions;
pub mod pending;
pub mod publish;
pub mod schedule;
pub mod update;

/// ProgressBar Style for a batch, will look like `[0/0] [00:00:00] [#>-] CustomMsg`
static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
	return ProgressStyle::default_bar()
		.template("{prefix:.dim} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
		.expect("Expected ProgressStyle template to be valid")
		.progress_chars("#>-");
});

/// Run `action` as a batch over `store`, showing the progress either as a bar (interactive) or as lines
pub fn run_pipeline(main_args: &CliDerive, store: &DatasetStore, action: &mut dyn RowAction) -> Result<BatchReport, crate::Error> {
	let pgbar: ProgressBar = ProgressBar::hidden().with_style(BATCH_STYLE.clone());
	utils::set_progressbar(&pgbar, main_args);

	let mut done: u64 = 0;
	let mut total: u64 = 0;

	let pgcb = |event: BatchProgress| {
		if main_args.is_interactive() {
			match event {
				BatchProgress::Loaded(pending, _) => {
					total = pending as u64;
					pgbar.set_length(total);
					pgbar.set_prefix(format!("[{done}/{total}]"));
				},
				BatchProgress::RowStarting(_, label) => pgbar.set_message(utils::truncate_message_term_width(&label)),
				BatchProgress::RowFinished(_, result) => {
					done += 1;
					pgbar.inc(1);
					pgbar.set_prefix(format!("[{done}/{total}]"));

					if let RowResult::Failed(msg) = result {
						pgbar.println(format!("{} {}", "Failed:".color(Color::Red), msg));
					}
				},
				BatchProgress::StoppedEarly(_, msg) => {
					pgbar.println(format!("{} {}", "Quota exhausted, stopping:".color(Color::Yellow), msg));
				},
				BatchProgress::Finished => pgbar.finish_and_clear(),
			}
		} else {
			match event {
				BatchProgress::Loaded(pending, all) => println!("{pending} of {all} rows pending"),
				BatchProgress::RowStarting(index, label) => println!("Starting row {index}: \"{label}\""),
				BatchProgress::RowFinished(index, result) => match result {
					RowResult::Recorded => println!("Finished row {index}"),
					RowResult::NotRecorded => println!("Finished row {index}, but the progress could not be recorded"),
					RowResult::Skipped(reason) => println!("Skipped row {index}: {reason}"),
					RowResult::Failed(msg) => println!("Failed row {index}: {msg}"),
				},
				BatchProgress::StoppedEarly(index, msg) => println!("Quota exhausted at row {index}, stopping: {msg}"),
				BatchProgress::Finished => (),
			}
		}
	};

	let report = run_batch(store, action, pgcb)?;

	print_report(&report, main_args.enable_colors());

	return Ok(report);
}

/// Print the summary of a batch
fn print_report(report: &BatchReport, colors: bool) {
	let mut line = format!(
		"Done: {} recorded, {} not recorded, {} skipped, {} failed (of {} pending)",
		report.recorded, report.not_recorded, report.skipped, report.failed, report.pending
	);

	if let Some(index) = report.stopped_at {
		line.push_str(&format!("; stopped early at row {index}, run again once the quota is reset"));
	}

	if colors && (report.failed > 0 || report.stopped_at.is_some()) {
		println!("{}", line.color(Color::Yellow));
	} else {
		println!("{line}");
	}
}
