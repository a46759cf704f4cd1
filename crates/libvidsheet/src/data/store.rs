//! Module containing [`DatasetStore`], the durable copy of the dataset

use std::{
	fs::File,
	io::{
		BufReader,
		BufWriter,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
};

use reqwest::blocking::Client;

use super::dataset::Dataset;
use crate::error::IOErrorToError;

/// Suffix for the temporary file a dataset is written to before replacing the durable copy
const TMP_SUFFIX: &str = ".tmp";

/// Remote copy of the dataset, only used while no durable copy exists yet
#[derive(Debug, Clone)]
pub struct Mirror {
	/// URL returning the dataset as CSV
	pub url: String,
	client:  Client,
}

impl Mirror {
	/// Create a new instance of [`Mirror`]
	pub fn new<U: Into<String>>(url: U, client: Client) -> Self {
		return Self { url: url.into(), client };
	}
}

/// The durable store: a CSV file that is read wholesale and rewritten wholesale
///
/// This is the system of record for progress, it is not locked, so only one process may use it at a time
#[derive(Debug, Clone)]
pub struct DatasetStore {
	/// Path of the durable CSV file
	path:   PathBuf,
	/// Where to get the dataset from if `path` does not exist yet
	mirror: Option<Mirror>,
}

impl DatasetStore {
	/// Create a new instance of [`DatasetStore`] without a mirror
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		return Self {
			path:   path.as_ref().to_owned(),
			mirror: None,
		};
	}

	/// Builder function to add a remote mirror
	#[must_use]
	pub fn with_mirror(mut self, mirror: Mirror) -> Self {
		self.mirror = Some(mirror);

		return self;
	}

	/// Get the path of the durable file
	#[must_use]
	pub fn path(&self) -> &Path {
		return &self.path;
	}

	/// Load the durable dataset
	///
	/// If no durable copy exists yet, the mirror is fetched and saved as the durable copy first.
	/// Errors if neither is available or the content cannot be parsed.
	pub fn load(&self) -> Result<Dataset, crate::Error> {
		if self.path.is_file() {
			let reader = BufReader::new(File::open(&self.path).attach_path_err(&self.path)?);

			return Dataset::from_reader(reader);
		}

		if self.path.exists() {
			return Err(crate::Error::not_a_file(
				"Dataset path exists, but is not a file",
				&self.path,
			));
		}

		let Some(mirror) = &self.mirror else {
			return Err(crate::Error::not_a_file(
				"Dataset does not exist and no mirror is configured",
				&self.path,
			));
		};

		info!(
			"No local dataset at \"{}\", fetching it from \"{}\"",
			self.path.display(),
			mirror.url
		);

		let body = crate::fetch::get_text(&mirror.client, &mirror.url)?;
		let dataset = Dataset::from_reader(body.as_bytes())?;

		self.save(&dataset)?;

		return Ok(dataset);
	}

	/// Rewrite the durable copy with `dataset`
	///
	/// The data is written to a temporary file next to the durable copy and then renamed over it.
	pub fn save(&self, dataset: &Dataset) -> Result<(), crate::Error> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent).attach_path_err(parent)?;
			}
		}

		let mut tmp_path = self.path.clone().into_os_string();
		tmp_path.push(TMP_SUFFIX);
		let tmp_path = PathBuf::from(tmp_path);

		{
			let mut writer = BufWriter::new(File::create(&tmp_path).attach_path_err(&tmp_path)?);
			dataset.to_writer(&mut writer)?;
			writer.flush().attach_path_err(&tmp_path)?;
		}

		std::fs::rename(&tmp_path, &self.path).attach_path_err(&self.path)?;
		trace!("Saved dataset to \"{}\"", self.path.display());

		return Ok(());
	}
}
