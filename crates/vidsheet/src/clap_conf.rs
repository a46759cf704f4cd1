//! Module for Clap related structs (derived)

#![deny(missing_docs)] // comments are used for "--help" generation, so it should always be defined

use clap::{
	ArgAction,
	Args,
	Parser,
	Subcommand,
	ValueEnum,
};
use is_terminal::IsTerminal;
use libvidsheet::{
	data::row::{
		ColumnNames,
		Visibility,
	},
	error::IOErrorToError,
	main::{
		progress::MatchStrategy,
		schedule::{
			parse_time,
			parse_timezone,
		},
	},
	utils::to_absolute,
};
use std::path::PathBuf;

/// Trait to check and transform all Command Structures
trait Check {
	/// Check and transform self to be correct
	fn check(&mut self) -> Result<(), crate::Error>;
}

#[derive(Debug, Parser, Clone, PartialEq)]
#[command(author, version = env!("VIDSHEET_VERSION"), about, long_about = None)]
#[command(bin_name("vidsheet"))]
#[command(disable_help_subcommand(true))] // Disable subcommand "help", only "-h --help" should be used
#[command(subcommand_negates_reqs(true))]
pub struct CliDerive {
	/// Set Loggin verbosity (0 - Default - WARN, 1 - INFO, 2 - DEBUG, 3 - TRACE)
	#[arg(short, long, action = ArgAction::Count)]
	pub verbosity:    u8,
	/// Explicitly set interactive / not interactive
	#[arg(long = "interactive", env = "VIDSHEET_INTERACTIVE")]
	pub explicit_tty: Option<bool>,
	/// Force Color to be active in any mode
	#[arg(long = "color", env = "VIDSHEET_COLOR")]
	pub force_color:  bool,

	#[command(flatten)]
	pub source:  SourceArgs,
	#[command(flatten)]
	pub host:    HostArgs,
	#[command(flatten)]
	pub columns: ColumnArgs,

	#[command(subcommand)]
	pub subcommands: SubCommands,
}

impl CliDerive {
	/// Execute clap::Parser::parse and apply custom validation and transformation logic
	pub fn custom_parse() -> Result<Self, crate::Error> {
		let mut parsed = Self::parse();

		Check::check(&mut parsed)?;

		return Ok(parsed);
	}

	/// Get if the mode is interactive or not
	#[must_use]
	pub fn is_interactive(&self) -> bool {
		if let Some(explicit) = self.explicit_tty {
			return explicit;
		}

		return std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
	}

	/// Get if the colors are enabled or not
	#[must_use]
	pub fn enable_colors(&self) -> bool {
		return self.force_color | self.is_interactive();
	}
}

impl Check for CliDerive {
	fn check(&mut self) -> Result<(), crate::Error> {
		if self.subcommands.requires_dataset() && self.source.dataset_path.is_none() {
			return Err(crate::Error::other(
				"A dataset path is required, set \"--dataset\" or \"VIDSHEET_DATASET\"",
			));
		}

		Check::check(&mut self.source)?;
		Check::check(&mut self.host)?;

		return Check::check(&mut self.subcommands);
	}
}

/// Where the dataset is read from and written to
#[derive(Debug, Args, Clone, PartialEq)]
pub struct SourceArgs {
	/// Path of the durable CSV dataset, progress is written into this file
	#[arg(long = "dataset", env = "VIDSHEET_DATASET", global = true)]
	pub dataset_path: Option<PathBuf>,
	/// URL to fetch the dataset from (as CSV) when the durable dataset does not exist yet
	#[arg(long = "mirror", env = "VIDSHEET_MIRROR", global = true)]
	pub mirror_url:   Option<String>,
}

impl Check for SourceArgs {
	fn check(&mut self) -> Result<(), crate::Error> {
		if let Some(path) = &self.dataset_path {
			self.dataset_path = Some(to_absolute(path).attach_path_err(path)?);
		}

		return Ok(());
	}
}

/// How the hosting platform is reached
#[derive(Debug, Args, Clone, PartialEq)]
pub struct HostArgs {
	/// Do not contact the hosting platform, only log what would be done (progress is still recorded)
	#[arg(long = "dry-run", env = "VIDSHEET_DRY_RUN", global = true)]
	pub dry_run:             bool,
	/// Path of the OAuth client secrets JSON file
	#[arg(long = "client-secrets", env = "VIDSHEET_CLIENT_SECRETS", global = true)]
	pub client_secrets_path: Option<PathBuf>,
	/// Path where the OAuth token is cached, default is "CONFIG_DIR/vidsheet/token.json"
	#[arg(long = "token-cache", env = "VIDSHEET_TOKEN_CACHE", global = true)]
	pub token_cache_path:    Option<PathBuf>,
	/// A already obtained access token, used instead of the OAuth flow
	#[arg(long = "access-token", env = "VIDSHEET_ACCESS_TOKEN", global = true, hide_env_values = true)]
	pub access_token:        Option<String>,
}

impl Check for HostArgs {
	fn check(&mut self) -> Result<(), crate::Error> {
		if let Some(path) = &self.client_secrets_path {
			self.client_secrets_path = Some(to_absolute(path).attach_path_err(path)?);
		}

		self.token_cache_path = Some(match &self.token_cache_path {
			Some(path) => to_absolute(path).attach_path_err(path)?,
			None => dirs::config_dir()
				.ok_or_else(|| return crate::Error::other("Could not find a config directory, set \"--token-cache\""))?
				.join("vidsheet")
				.join("token.json"),
		});

		return Ok(());
	}
}

/// Names of the dataset columns
#[derive(Debug, Args, Clone, PartialEq)]
pub struct ColumnArgs {
	/// Column with the video title, also used to find a row again
	#[arg(long = "title-column", env = "VIDSHEET_TITLE_COLUMN", default_value = "Title", global = true)]
	pub title_column:          String,
	/// Column with the URL of the media to upload
	#[arg(long = "media-column", env = "VIDSHEET_MEDIA_COLUMN", default_value = "Media URL", global = true)]
	pub media_url_column:      String,
	/// Column with the URL of the published video
	#[arg(long = "video-url-column", env = "VIDSHEET_VIDEO_URL_COLUMN", default_value = "YouTube URL", global = true)]
	pub video_url_column:      String,
	/// Column with the video description
	#[arg(long = "description-column", env = "VIDSHEET_DESCRIPTION_COLUMN", default_value = "Description", global = true)]
	pub description_column:    String,
	/// Column with comma separated tags
	#[arg(long = "tags-column", env = "VIDSHEET_TAGS_COLUMN", default_value = "Tags", global = true)]
	pub tags_column:           String,
	/// Column with the category id
	#[arg(long = "category-column", env = "VIDSHEET_CATEGORY_COLUMN", default_value = "Category", global = true)]
	pub category_column:       String,
	/// Column with the visibility (public, unlisted, private)
	#[arg(long = "visibility-column", env = "VIDSHEET_VISIBILITY_COLUMN", default_value = "Privacy", global = true)]
	pub visibility_column:     String,
	/// Column with the "made for kids" flag
	#[arg(long = "kids-column", env = "VIDSHEET_KIDS_COLUMN", default_value = "Made For Kids", global = true)]
	pub made_for_kids_column:  String,
	/// Column with the progress marker of "publish"
	#[arg(long = "publish-marker-column", env = "VIDSHEET_PUBLISH_MARKER_COLUMN", default_value = "Uploaded", global = true)]
	pub publish_marker_column: String,
	/// Column with the progress marker of "update"
	#[arg(
		long = "update-marker-column",
		env = "VIDSHEET_UPDATE_MARKER_COLUMN",
		default_value = "updated_description",
		global = true
	)]
	pub update_marker_column:  String,
}

impl ColumnArgs {
	/// Convert to the library [`ColumnNames`]
	#[must_use]
	pub fn to_column_names(&self) -> ColumnNames {
		return ColumnNames {
			title:          self.title_column.clone(),
			media_url:      self.media_url_column.clone(),
			video_url:      self.video_url_column.clone(),
			description:    self.description_column.clone(),
			tags:           self.tags_column.clone(),
			category:       self.category_column.clone(),
			visibility:     self.visibility_column.clone(),
			made_for_kids:  self.made_for_kids_column.clone(),
			publish_marker: self.publish_marker_column.clone(),
			update_marker:  self.update_marker_column.clone(),
		};
	}
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum SubCommands {
	/// Upload every row that is not marked as uploaded yet
	Publish(CommandPublish),
	/// Replace the description of every row that is not marked as updated yet
	Update(CommandUpdate),
	/// List the rows a pipeline would process, without doing anything
	Pending(CommandPending),
	/// Run a pipeline every day at a fixed time
	Schedule(CommandSchedule),
	/// Run the interactive authorization and cache the token
	Auth(CommandAuth),
	/// Generate shell completions
	Completions(CommandCompletions),
}

impl SubCommands {
	/// Get whether this subcommand works on the dataset
	#[must_use]
	pub fn requires_dataset(&self) -> bool {
		return !matches!(self, SubCommands::Auth(_) | SubCommands::Completions(_));
	}
}

impl Check for SubCommands {
	fn check(&mut self) -> Result<(), crate::Error> {
		match self {
			SubCommands::Publish(v) => return Check::check(v),
			SubCommands::Update(v) => return Check::check(v),
			SubCommands::Pending(v) => return Check::check(v),
			SubCommands::Schedule(v) => return Check::check(v),
			SubCommands::Auth(v) => return Check::check(v),
			SubCommands::Completions(v) => return Check::check(v),
		}
	}
}

/// Parse a [`Visibility`] for clap
fn parse_visibility(input: &str) -> Result<Visibility, String> {
	return Visibility::try_from_str(input).ok_or_else(|| return format!("unknown visibility \"{input}\""));
}

/// Parse a [`MatchStrategy`] for clap
fn parse_match_strategy(input: &str) -> Result<MatchStrategy, String> {
	return MatchStrategy::try_from_str(input)
		.ok_or_else(|| return format!("unknown strategy \"{input}\", expected \"title\" or \"position\""));
}

/// Upload all pending rows as new videos
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandPublish {
	/// Directory to cache downloaded media in, default is "CACHE_DIR/vidsheet/media"
	#[arg(long = "media-cache", env = "VIDSHEET_MEDIA_CACHE")]
	pub media_cache_path: Option<PathBuf>,
	/// Visibility for rows that do not set one
	#[arg(long = "visibility", env = "VIDSHEET_VISIBILITY", default_value = "private", value_parser = parse_visibility)]
	pub visibility:       Visibility,
	/// Category id for rows that do not set one
	#[arg(long = "category", env = "VIDSHEET_CATEGORY")]
	pub category_id:      Option<String>,
	/// File extension of the cached media, should match the container of the media URLs
	#[arg(long = "media-extension", env = "VIDSHEET_MEDIA_EXTENSION", default_value = "mp4")]
	pub media_extension:  String,
	/// How a uploaded row is found again to mark it (title, position)
	#[arg(long = "match-by", default_value = "title", value_parser = parse_match_strategy)]
	pub match_by:         MatchStrategy,
}

impl Check for CommandPublish {
	fn check(&mut self) -> Result<(), crate::Error> {
		self.media_cache_path = Some(match &self.media_cache_path {
			Some(path) => to_absolute(path).attach_path_err(path)?,
			None => dirs::cache_dir()
				.unwrap_or_else(std::env::temp_dir)
				.join("vidsheet")
				.join("media"),
		});

		return Ok(());
	}
}

/// Replace the description of all pending rows
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandUpdate {
	/// How a updated row is found again to mark it (title, position)
	#[arg(long = "match-by", default_value = "position", value_parser = parse_match_strategy)]
	pub match_by: MatchStrategy,
}

impl Check for CommandUpdate {
	fn check(&mut self) -> Result<(), crate::Error> {
		return Ok(());
	}
}

/// The pipelines that can be listed
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum PipelineKind {
	/// The publish pipeline
	Publish,
	/// The metadata-update pipeline
	Update,
}

/// List the pending rows of a pipeline
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandPending {
	/// The pipeline to list the rows for
	#[arg(value_enum)]
	pub pipeline: PipelineKind,
}

impl Check for CommandPending {
	fn check(&mut self) -> Result<(), crate::Error> {
		return Ok(());
	}
}

/// Run a pipeline daily
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandSchedule {
	/// Time of day to run at, as "HH:MM"
	#[arg(long = "at", env = "VIDSHEET_SCHEDULE_AT")]
	pub at:       String,
	/// IANA timezone the time is in, like "Europe/Berlin"
	#[arg(long = "timezone", env = "VIDSHEET_SCHEDULE_TIMEZONE", default_value = "UTC")]
	pub timezone: String,
	/// Also run once right away
	#[arg(long = "run-now")]
	pub run_now:  bool,

	#[command(subcommand)]
	pub pipeline: ScheduledPipeline,
}

impl Check for CommandSchedule {
	fn check(&mut self) -> Result<(), crate::Error> {
		let (hour, minute) = parse_time(&self.at)?;
		self.at = format!("{hour:02}:{minute:02}");
		self.timezone = parse_timezone(&self.timezone)?.name().to_owned();

		return Check::check(&mut self.pipeline);
	}
}

/// The pipeline to run on a schedule
#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum ScheduledPipeline {
	/// Run "publish" on the schedule
	Publish(CommandPublish),
	/// Run "update" on the schedule
	Update(CommandUpdate),
}

impl Check for ScheduledPipeline {
	fn check(&mut self) -> Result<(), crate::Error> {
		match self {
			ScheduledPipeline::Publish(v) => return Check::check(v),
			ScheduledPipeline::Update(v) => return Check::check(v),
		}
	}
}

/// Authorize against the hosting platform
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandAuth {}

impl Check for CommandAuth {
	fn check(&mut self) -> Result<(), crate::Error> {
		return Ok(());
	}
}

/// Generate shell completions
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandCompletions {
	/// Output path to write the completions to, default is to write to STDOUT
	#[arg(short = 'o', long = "out")]
	pub output_file_path: Option<PathBuf>,
	/// The Shell to generate completions for
	#[arg(value_enum)]
	pub shell:            clap_complete::Shell,
}

impl Check for CommandCompletions {
	fn check(&mut self) -> Result<(), crate::Error> {
		if let Some(path) = &self.output_file_path {
			self.output_file_path = Some(to_absolute(path).attach_path_err(path)?);
		}

		return Ok(());
	}
}

#[cfg(test)]
mod test {
	use super::*;

	/// Helper to build a [`CliDerive`] with everything at default
	fn cli(subcommands: SubCommands) -> CliDerive {
		return CliDerive {
			verbosity: 0,
			explicit_tty: None,
			force_color: false,
			source: SourceArgs {
				dataset_path: Some(PathBuf::from("/data/videos.csv")),
				mirror_url:   None,
			},
			host: HostArgs {
				dry_run:             false,
				client_secrets_path: None,
				token_cache_path:    Some(PathBuf::from("/config/token.json")),
				access_token:        None,
			},
			columns: ColumnArgs {
				title_column:          "Title".to_owned(),
				media_url_column:      "Media URL".to_owned(),
				video_url_column:      "YouTube URL".to_owned(),
				description_column:    "Description".to_owned(),
				tags_column:           "Tags".to_owned(),
				category_column:       "Category".to_owned(),
				visibility_column:     "Privacy".to_owned(),
				made_for_kids_column:  "Made For Kids".to_owned(),
				publish_marker_column: "Uploaded".to_owned(),
				update_marker_column:  "updated_description".to_owned(),
			},
			subcommands,
		};
	}

	fn update() -> SubCommands {
		return SubCommands::Update(CommandUpdate {
			match_by: MatchStrategy::Position,
		});
	}

	mod cli_derive {
		use super::*;

		#[test]
		fn test_check() {
			let init_default = cli(update());

			let mut cloned = init_default.clone();
			assert!(cloned.check().is_ok());
			assert_eq!(init_default, cloned);
		}

		#[test]
		fn test_check_requires_dataset() {
			let mut missing = cli(update());
			missing.source.dataset_path = None;
			assert!(missing.check().is_err());

			let mut completions = cli(SubCommands::Auth(CommandAuth {}));
			completions.source.dataset_path = None;
			assert!(completions.check().is_ok());
		}

		#[test]
		fn test_is_interactive_explicit() {
			let mut explicit = cli(update());

			explicit.explicit_tty = Some(false);
			assert!(!explicit.is_interactive());

			explicit.explicit_tty = Some(true);
			assert!(explicit.is_interactive());
		}

		#[test]
		fn test_enable_colors_forced() {
			let mut forced = cli(update());
			forced.explicit_tty = Some(false);
			forced.force_color = true;

			assert!(forced.enable_colors());
		}

		#[test]
		fn test_parse_defaults() {
			let parsed = CliDerive::try_parse_from(["vidsheet", "--dataset", "/data/videos.csv", "publish"])
				.expect("Expected arguments to parse");

			assert_eq!(ColumnNames::default(), parsed.columns.to_column_names());
			assert_eq!(
				SubCommands::Publish(CommandPublish {
					media_cache_path: None,
					visibility:       Visibility::Private,
					category_id:      None,
					media_extension:  "mp4".to_owned(),
					match_by:         MatchStrategy::Title,
				}),
				parsed.subcommands
			);

			let parsed = CliDerive::try_parse_from(["vidsheet", "update", "--dataset", "/data/videos.csv"])
				.expect("Expected arguments to parse");
			assert_eq!(update(), parsed.subcommands);
		}

		#[test]
		fn test_parse_publish_visibility_and_column() {
			let parsed = CliDerive::try_parse_from([
				"vidsheet",
				"--dataset",
				"/data/videos.csv",
				"--visibility-column",
				"Sichtbarkeit",
				"publish",
				"--visibility",
				"unlisted",
				"--media-extension",
				"webm",
			])
			.expect("Expected arguments to parse");

			assert_eq!("Sichtbarkeit", parsed.columns.to_column_names().visibility);
			let SubCommands::Publish(publish) = parsed.subcommands else {
				panic!("Expected the publish subcommand");
			};
			assert_eq!(Visibility::Unlisted, publish.visibility);
			assert_eq!("webm", publish.media_extension);
		}

		#[test]
		fn test_parse_scheduled_publish() {
			let parsed = CliDerive::try_parse_from([
				"vidsheet",
				"--dataset",
				"/data/videos.csv",
				"schedule",
				"--at",
				"06:30",
				"publish",
				"--visibility",
				"public",
			])
			.expect("Expected arguments to parse");

			let SubCommands::Schedule(schedule) = parsed.subcommands else {
				panic!("Expected the schedule subcommand");
			};
			let ScheduledPipeline::Publish(publish) = schedule.pipeline else {
				panic!("Expected the scheduled publish pipeline");
			};
			assert_eq!(Visibility::Public, publish.visibility);
			assert_eq!("Privacy", parsed.columns.visibility_column);
		}
	}

	mod command_publish {
		use super::*;

		#[test]
		fn test_check_sets_cache() {
			let mut publish = CommandPublish {
				media_cache_path: None,
				visibility:       Visibility::Private,
				category_id:      None,
				media_extension:  "mp4".to_owned(),
				match_by:         MatchStrategy::Title,
			};

			assert!(publish.check().is_ok());
			assert!(publish.media_cache_path.unwrap().ends_with("vidsheet/media"));
		}
	}

	mod command_schedule {
		use super::*;

		#[test]
		fn test_check_normalizes() {
			let mut schedule = CommandSchedule {
				at:       " 7:05".to_owned(),
				timezone: "Europe/Berlin".to_owned(),
				run_now:  false,
				pipeline: ScheduledPipeline::Update(CommandUpdate {
					match_by: MatchStrategy::Position,
				}),
			};

			assert!(schedule.check().is_ok());
			assert_eq!("07:05", schedule.at);
		}

		#[test]
		fn test_check_invalid() {
			let mut schedule = CommandSchedule {
				at:       "25:00".to_owned(),
				timezone: "UTC".to_owned(),
				run_now:  false,
				pipeline: ScheduledPipeline::Update(CommandUpdate {
					match_by: MatchStrategy::Position,
				}),
			};
			assert!(schedule.check().is_err());

			schedule.at = "10:00".to_owned();
			schedule.timezone = "Nowhere/Land".to_owned();
			assert!(schedule.check().is_err());
		}
	}

	mod command_completions {
		use super::*;

		#[test]
		fn test_check() {
			let init_default = CommandCompletions {
				output_file_path: None,
				shell:            clap_complete::Shell::Bash,
			};

			let mut cloned = init_default.clone();
			assert!(cloned.check().is_ok());
			assert_eq!(init_default, cloned);
		}
	}
}
