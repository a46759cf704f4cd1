//! Module for the Error type this library uses

use std::{
	backtrace::Backtrace,
	io::Error as ioError,
	path::Path,
};

/// Macro to not repeat having to do multiple implementations of a [ErrorInner] variant with the same string type
macro_rules! fn_string {
	($fn_name:ident, $fortype:expr) => {
		#[doc = concat!("Create a new [Self] as [", stringify!($fortype), "]")]
		pub fn $fn_name<M>(msg: M) -> Self
		where
			M: Into<String>,
		{
			return Self::new($fortype(msg.into()));
		}
	};
}

/// Macro to not repeat having to do multiple implementations of a [ErrorInner] variant with the same path type
macro_rules! fn_path {
	($fn_name:ident, $fortype:expr) => {
		#[doc = concat!("Create a new [Self] as [", stringify!($fortype), "]")]
		pub fn $fn_name<M, P>(msg: M, path: P) -> Self
		where
			M: Into<String>,
			P: AsRef<Path>,
		{
			return Self::new($fortype(msg.into(), path.as_ref().to_string_lossy().to_string()));
		}
	};
}

/// Lower-cased substrings that identify a error message as the hosting platform running out of quota
pub const QUOTA_ERROR_MARKERS: &[&str] = &[
	"quotaexceeded",
	"quota exceeded",
	"exceeded your quota",
	"dailylimitexceeded",
];

/// Error type for libvidsheet, contains a backtrace, wrapper around [ErrorInner]
#[derive(Debug)]
pub struct Error {
	/// The actual error
	source:    ErrorInner,
	/// The backtrace for the error
	backtrace: Backtrace,
}

impl Error {
	/// Construct a new [Error] instance based on [ErrorInner]
	pub fn new(source: ErrorInner) -> Self {
		return Self {
			source,
			backtrace: Backtrace::capture(),
		};
	}

	/// Get the backtrace that is stored
	pub fn get_backtrace(&self) -> &Backtrace {
		return &self.backtrace;
	}

	/// Get the inner error
	pub fn inner(&self) -> &ErrorInner {
		return &self.source;
	}

	/// Create a custom [ioError] with this [Error] wrapped around with a [Path] attached
	pub fn custom_ioerror_path<M, P>(kind: std::io::ErrorKind, msg: M, path: P) -> Self
	where
		M: Into<String>,
		P: AsRef<Path>,
	{
		return Self::new(ErrorInner::IoError(
			ioError::new(kind, msg.into()),
			format_path(path.as_ref().to_string_lossy().to_string()),
		));
	}

	/// Create a custom [ioError] with this [Error] wrapped around with a location attached
	pub fn custom_ioerror_location<M, L>(kind: std::io::ErrorKind, msg: M, location: L) -> Self
	where
		M: Into<String>,
		L: AsRef<str>,
	{
		return Self::new(ErrorInner::IoError(
			ioError::new(kind, msg.into()),
			format_location(location.as_ref()),
		));
	}

	/// Create a new [Self] as [ErrorInner::HostApi]
	pub fn host_api<M>(status: u16, msg: M) -> Self
	where
		M: Into<String>,
	{
		return Self::new(ErrorInner::HostApi(status, msg.into()));
	}

	fn_string!(other, ErrorInner::Other);
	fn_string!(quota_exhausted, ErrorInner::QuotaExhausted);
	fn_string!(authorization, ErrorInner::Authorization);
	fn_string!(missing_field, ErrorInner::MissingField);
	fn_string!(invalid_identifier, ErrorInner::InvalidIdentifier);
	fn_string!(invalid_schedule, ErrorInner::InvalidSchedule);
	fn_path!(not_a_directory, ErrorInner::NotADirectory);
	fn_path!(not_a_file, ErrorInner::NotAFile);

	/// Get whether this error signals that the hosting platform quota for the day is used up
	///
	/// Matches the dedicated [ErrorInner::QuotaExhausted] variant and any other error whose message contains one of [QUOTA_ERROR_MARKERS]
	#[must_use]
	pub fn is_quota_exhausted(&self) -> bool {
		if matches!(self.source, ErrorInner::QuotaExhausted(_)) {
			return true;
		}

		let msg = self.source.to_string().to_lowercase();

		return QUOTA_ERROR_MARKERS.iter().any(|marker| return msg.contains(marker));
	}
}

impl PartialEq for Error {
	fn eq(&self, other: &Self) -> bool {
		return self.source == other.source;
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return self.source.fmt(f);
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		return self.source.source();
	}
}

// implement all From<> variants that ErrorInner also implements
impl<T> From<T> for Error
where
	T: Into<ErrorInner>,
{
	fn from(value: T) -> Self {
		return Self::new(value.into());
	}
}

/// Error type for "vidsheet", implements all Error types that could happen in this lib
#[derive(thiserror::Error, Debug)]
pub enum ErrorInner {
	/// Wrapper Variant for [`std::io::Error`]
	/// Argument 1 (String) is up to the implementation to set, commonly the path
	#[error("IoError: {0}; {1}")]
	IoError(std::io::Error, String),
	/// Wrapper Variant for [`std::string::FromUtf8Error`]
	#[error("FromStringUTF8Error: {0}")]
	FromStringUTF8Error(#[from] std::string::FromUtf8Error),
	/// Variant for serde-json Errors
	#[error("SerdeJSONError: {0}")]
	SerdeJSONError(#[from] serde_json::Error),
	/// Variant for csv reading / writing Errors
	#[error("CsvError: {0}")]
	CsvError(#[from] csv::Error),
	/// Variant for http client Errors (connection, status, body decoding)
	#[error("HttpError: {0}")]
	HttpError(#[from] reqwest::Error),
	/// Variant for url parsing Errors
	#[error("UrlParseError: {0}")]
	UrlParseError(#[from] url::ParseError),

	/// Variant for when the hosting platform api returned a unsuccessful response
	/// values: (http status, message)
	#[error("HostApiError: status {0}: {1}")]
	HostApi(u16, String),
	/// Variant for when the hosting platform reported that the quota for the day is used up
	#[error("QuotaExhausted: {0}")]
	QuotaExhausted(String),
	/// Variant for when no valid credential could be obtained
	#[error("AuthorizationError: {0}")]
	Authorization(String),
	/// Variant for when a required row field is missing or empty
	#[error("MissingField: {0}")]
	MissingField(String),
	/// Variant for when no platform identifier could be extracted from a value
	#[error("InvalidIdentifier: {0}")]
	InvalidIdentifier(String),
	/// Variant for when a schedule time or timezone is not valid
	#[error("InvalidSchedule: {0}")]
	InvalidSchedule(String),
	/// Variant for when a directory path was expected but did not exist yet or was not a directory
	/// TODO: replace with io::ErrorKind::NotADirectory once stable <https://github.com/rust-lang/rust/issues/86442>
	#[error("NotADirectory: {0}; Path: \"{1}\"")]
	NotADirectory(String, String),
	/// Variant for when a file path was expected but did not exist yet or was not a file
	#[error("NotAFile: {0}; Path: \"{1}\"")]
	NotAFile(String, String),
	/// Variant for Other messages
	#[error("Other: {0}")]
	Other(String),
}

// this is custom, some errors like "std::io::Error" do not implement "PartialEq", but some inner type may do
impl PartialEq for ErrorInner {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::IoError(l0, l1), Self::IoError(r0, r1)) => return l0.kind() == r0.kind() && l1 == r1,
			(Self::FromStringUTF8Error(l0), Self::FromStringUTF8Error(r0)) => return l0 == r0,
			(Self::UrlParseError(l0), Self::UrlParseError(r0)) => return l0 == r0,

			(Self::HostApi(l0, l1), Self::HostApi(r0, r1)) => return l0 == r0 && l1 == r1,
			(Self::QuotaExhausted(l0), Self::QuotaExhausted(r0)) => return l0 == r0,
			(Self::Authorization(l0), Self::Authorization(r0)) => return l0 == r0,
			(Self::MissingField(l0), Self::MissingField(r0)) => return l0 == r0,
			(Self::InvalidIdentifier(l0), Self::InvalidIdentifier(r0)) => return l0 == r0,
			(Self::InvalidSchedule(l0), Self::InvalidSchedule(r0)) => return l0 == r0,
			(Self::NotADirectory(l0, l1), Self::NotADirectory(r0, r1)) => return l0 == r0 && l1 == r1,
			(Self::NotAFile(l0, l1), Self::NotAFile(r0, r1)) => return l0 == r0 && l1 == r1,
			(Self::Other(l0), Self::Other(r0)) => return l0 == r0,

			(_, _) => return false,
		}
	}
}

/// Helper function to keep consistent formatting
#[inline]
fn format_path(msg: String) -> String {
	return format!("Path \"{}\"", msg);
}
/// Helper function to keep consistent formatting
#[inline]
fn format_location(msg: &str) -> String {
	return format!("Location \"{}\"", msg);
}

/// Trait to map [std::io::Error] into [Error]
pub trait IOErrorToError<T> {
	/// Map a [std::io::Error] to [Error] with a [std::path::Path] attached
	fn attach_path_err<P: AsRef<Path>>(self, path: P) -> Result<T, crate::Error>;
	/// Map a [std::io::Error] to [Error] with a location attached (for when [attach_path_err] is not applicable)
	fn attach_location_err<P: AsRef<str>>(self, pipe_msg: P) -> Result<T, crate::Error>;
}

impl<T> IOErrorToError<T> for Result<T, std::io::Error> {
	fn attach_path_err<P: AsRef<Path>>(self, path: P) -> Result<T, crate::Error> {
		return match self {
			Ok(v) => Ok(v),
			Err(e) => Err(crate::Error::new(ErrorInner::IoError(
				e,
				format_path(path.as_ref().to_string_lossy().to_string()),
			))),
		};
	}

	fn attach_location_err<L: AsRef<str>>(self, location: L) -> Result<T, crate::Error> {
		return match self {
			Ok(v) => Ok(v),
			Err(e) => Err(crate::Error::new(ErrorInner::IoError(
				e,
				format_location(location.as_ref()),
			))),
		};
	}
}
