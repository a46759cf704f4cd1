//! Module for running a pipeline once a day at a fixed wall-clock time

use std::str::FromStr;

use chrono::{
	DateTime,
	Utc,
};
use chrono_tz::Tz;
use cron::Schedule;

/// A daily trigger at `hour:minute` in timezone `tz`
#[derive(Debug, Clone)]
pub struct DailySchedule {
	hour:     u32,
	minute:   u32,
	tz:       Tz,
	schedule: Schedule,
}

impl DailySchedule {
	/// Create a new instance of [`DailySchedule`]
	pub fn new(hour: u32, minute: u32, tz: Tz) -> Result<Self, crate::Error> {
		if hour > 23 || minute > 59 {
			return Err(crate::Error::invalid_schedule(format!(
				"{hour:02}:{minute:02} is not a valid time of day"
			)));
		}

		// fields: sec min hour day-of-month month day-of-week
		let expression = format!("0 {minute} {hour} * * *");
		let schedule = Schedule::from_str(&expression)
			.map_err(|err| return crate::Error::invalid_schedule(format!("\"{expression}\": {err}")))?;

		return Ok(Self {
			hour,
			minute,
			tz,
			schedule,
		});
	}

	/// Create a new instance from the strings "HH:MM" and a IANA timezone name
	pub fn parse(time: &str, timezone: &str) -> Result<Self, crate::Error> {
		let (hour, minute) = parse_time(time)?;

		return Self::new(hour, minute, parse_timezone(timezone)?);
	}

	/// Get the next fire time strictly after `now`
	#[must_use]
	pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
		return self.schedule.after(&now.with_timezone(&self.tz)).next();
	}

	/// Block until the next fire time, then run `job`, forever
	///
	/// If `run_now` is set, `job` is also run once right away.
	/// A failing `job` is logged and the next fire time is awaited like after a success.
	/// Only returns if no next fire time can be computed.
	pub fn run_forever<F: FnMut() -> Result<(), crate::Error>>(&self, run_now: bool, mut job: F) -> Result<(), crate::Error> {
		if run_now {
			run_logged(&mut job);
		}

		loop {
			let now = Utc::now();
			let Some(next) = self.next_after(now) else {
				return Err(crate::Error::invalid_schedule(format!(
					"No next run for {:02}:{:02} {}",
					self.hour, self.minute, self.tz
				)));
			};

			info!("Next run at {}", next);
			let wait = (next.with_timezone(&Utc) - now).to_std().unwrap_or_default();
			std::thread::sleep(wait);

			run_logged(&mut job);
		}
	}
}

impl std::fmt::Display for DailySchedule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return write!(f, "daily at {:02}:{:02} {}", self.hour, self.minute, self.tz);
	}
}

/// Run `job`, only logging a error
fn run_logged<F: FnMut() -> Result<(), crate::Error>>(job: &mut F) {
	info!("Starting scheduled run");

	if let Err(err) = job() {
		error!("Scheduled run failed: {}", err);
	}
}

/// Parse a "HH:MM" time of day
pub fn parse_time(input: &str) -> Result<(u32, u32), crate::Error> {
	let invalid = || return crate::Error::invalid_schedule(format!("\"{input}\" is not in the form HH:MM"));

	let (hour, minute) = input.trim().split_once(':').ok_or_else(invalid)?;
	let hour: u32 = hour.parse().map_err(|_| return invalid())?;
	let minute: u32 = minute.parse().map_err(|_| return invalid())?;

	if hour > 23 || minute > 59 {
		return Err(invalid());
	}

	return Ok((hour, minute));
}

/// Parse a IANA timezone name like "Europe/Berlin"
pub fn parse_timezone(input: &str) -> Result<Tz, crate::Error> {
	return input
		.trim()
		.parse::<Tz>()
		.map_err(|_| return crate::Error::invalid_schedule(format!("Unknown timezone \"{input}\"")));
}
