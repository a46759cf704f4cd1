//! Module for utility functions, that may be used in various other modules

use std::path::{
	Path,
	PathBuf,
};

use path_absolutize::Absolutize;

/// Simple helper to resolve "~" to the Home directory
/// System agnostic as long as [`dirs::home_dir`] support's it
pub fn expand_tidle<I: AsRef<Path>>(input: I) -> Option<PathBuf> {
	let path = input.as_ref();

	if !path.starts_with("~") {
		return Some(path.to_owned());
	}
	if path == Path::new("~") {
		return dirs::home_dir();
	}

	let rest = path.strip_prefix("~").ok()?;
	let mut home = dirs::home_dir()?;

	// handle case where "home_dir" might be set to the root POSIX directory
	if home == Path::new("/") {
		return Some(rest.to_owned());
	}

	home.push(rest);

	return Some(home);
}

/// Convert input path to a absolute path, without hitting the filesystem.
/// This function handles `~`(home)
///
/// If the start is not absolute, CWD will be used.
///
/// This functions behavior:
/// - `/path/to/inner/../somewhere` -> `/path/to/somewhere`
/// - `relative/to/somewhere` -> `CWD/relative/to/somewhere`
/// - `./somewhere/./path` -> `CWD/somewhere/path`
/// - `~/somewhere/in/home` -> `HOME/somewhere/in/home`
pub fn to_absolute<P: AsRef<Path>>(input: P) -> std::io::Result<PathBuf> {
	let Some(converted) = expand_tidle(input) else {
		return Err(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			"Could not resolve \"~\"",
		));
	};

	return converted.absolutize().map(|v| return v.to_path_buf());
}

/// Replace every character that is not ascii-alphanumeric with a `_`, so that the result can be used as a file name
///
/// Example: `"My Video: Part 1"` -> `"My_Video__Part_1"`
pub fn sanitize_title<T: AsRef<str>>(title: T) -> String {
	return title
		.as_ref()
		.trim()
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() {
				return c;
			}

			return '_';
		})
		.collect();
}

/// Normalize a cell value for comparisons: trimmed and lower-cased
#[inline]
pub fn normalize_cell<T: AsRef<str>>(value: T) -> String {
	return value.as_ref().trim().to_lowercase();
}

/// Get the trimmed value, or [None] if it is empty after trimming
#[inline]
pub fn non_empty<T: AsRef<str> + ?Sized>(value: &T) -> Option<&str> {
	let trimmed = value.as_ref().trim();

	if trimmed.is_empty() {
		return None;
	}

	return Some(trimmed);
}
