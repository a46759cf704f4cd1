//! Module for the "schedule" command

use libvidsheet::main::schedule::DailySchedule;

use super::{
	publish::command_publish,
	update::command_update,
};
use crate::clap_conf::{
	CliDerive,
	CommandSchedule,
	ScheduledPipeline,
};

/// Handler function for the "schedule" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_schedule(main_args: &CliDerive, sub_args: &CommandSchedule) -> Result<(), crate::Error> {
	let schedule = DailySchedule::parse(&sub_args.at, &sub_args.timezone)?;

	println!("Running {schedule}");

	return schedule.run_forever(sub_args.run_now, || {
		return match &sub_args.pipeline {
			ScheduledPipeline::Publish(v) => command_publish(main_args, v),
			ScheduledPipeline::Update(v) => command_update(main_args, v),
		};
	});
}
