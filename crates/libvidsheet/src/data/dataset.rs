//! Module containing [`Dataset`] and the column resolving

use std::io::{
	Read,
	Write,
};

use crate::utils::normalize_cell;

/// A in-memory copy of the spreadsheet: one header row and the ordered data rows
///
/// Rows are allowed to have a different length than the header (cells at the end may be missing),
/// they are only padded when a cell past their end is written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
	/// The column names, in the order they appear in the file
	headers: Vec<String>,
	/// The data rows, without the header row
	rows:    Vec<Vec<String>>,
}

impl Dataset {
	/// Create a new instance of [`Dataset`] from headers and rows
	pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
		return Self { headers, rows };
	}

	/// Parse a CSV document, the first record is used as the header row
	///
	/// An empty document results in a empty dataset without headers.
	pub fn from_reader<R: Read>(reader: R) -> Result<Self, crate::Error> {
		let mut csv_reader = csv::ReaderBuilder::new()
			.has_headers(false)
			.flexible(true)
			.from_reader(reader);

		let mut records = csv_reader.records();

		let headers: Vec<String> = match records.next() {
			Some(record) => record?.iter().map(|v| return v.to_owned()).collect(),
			None => return Ok(Self::default()),
		};

		let mut rows = Vec::new();

		for record in records {
			rows.push(record?.iter().map(|v| return v.to_owned()).collect());
		}

		return Ok(Self { headers, rows });
	}

	/// Serialize this dataset as a CSV document, header row first
	pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), crate::Error> {
		let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

		csv_writer.write_record(&self.headers)?;

		for row in &self.rows {
			csv_writer.write_record(row)?;
		}

		csv_writer.flush().map_err(csv::Error::from)?;

		return Ok(());
	}

	/// Get the header row
	#[must_use]
	pub fn headers(&self) -> &[String] {
		return &self.headers;
	}

	/// Get all data rows
	#[must_use]
	pub fn rows(&self) -> &[Vec<String>] {
		return &self.rows;
	}

	/// Get the data row at `index` (header excluded)
	#[must_use]
	pub fn row(&self, index: usize) -> Option<&[String]> {
		return self.rows.get(index).map(|v| return v.as_slice());
	}

	/// Get the amount of data rows
	#[must_use]
	pub fn len(&self) -> usize {
		return self.rows.len();
	}

	/// Get if there are no data rows
	#[must_use]
	pub fn is_empty(&self) -> bool {
		return self.rows.is_empty();
	}

	/// Find the index of the column named `name`, see [`find_column`]
	#[must_use]
	pub fn find_column(&self, name: &str) -> Option<usize> {
		return find_column(&self.headers, name);
	}

	/// Find or append the column named `name`, see [`resolve_column`]
	pub fn resolve_column(&mut self, name: &str) -> usize {
		return resolve_column(&mut self.headers, name);
	}

	/// Get the cell at `row` and `column`, [None] if either is out of bounds
	#[must_use]
	pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
		return self
			.rows
			.get(row)
			.and_then(|v| return v.get(column))
			.map(|v| return v.as_str());
	}

	/// Set the cell at `row` and `column`, padding the row with empty cells if it is too short
	///
	/// Returns `false` if `row` does not exist
	pub fn set_cell<V: Into<String>>(&mut self, row: usize, column: usize, value: V) -> bool {
		let Some(row) = self.rows.get_mut(row) else {
			return false;
		};

		if row.len() <= column {
			row.resize(column + 1, String::new());
		}

		row[column] = value.into();

		return true;
	}
}

/// Find the index of the column named `name` in `headers`
///
/// Names are compared trimmed and case-insensitive, the first match wins.
#[must_use]
pub fn find_column(headers: &[String], name: &str) -> Option<usize> {
	let name = normalize_cell(name);

	return headers.iter().position(|v| return normalize_cell(v) == name);
}

/// Get the index of the column named `name` in `headers`, appending a new column with the trimmed `name` if it does not exist yet
///
/// Existing columns are never reordered or removed, so all previously known indexes stay valid.
pub fn resolve_column(headers: &mut Vec<String>, name: &str) -> usize {
	if let Some(index) = find_column(headers, name) {
		return index;
	}

	debug!("Column \"{}\" does not exist yet, appending it", name.trim());
	headers.push(name.trim().to_owned());

	return headers.len() - 1;
}
