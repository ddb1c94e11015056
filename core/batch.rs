/*!
This module defines the [`Batch`](struct.Batch.html) type and the csv batch source. Any `Iterator<Item = Result<Batch>>` can feed an evaluation.
*/

use anyhow::{format_err, Context, Result};
use ndarray::prelude::*;
use scorecard_util::progress_counter::ProgressCounter;
use std::{fs::File, io::Read, path::Path};

/// A group of examples evaluated together. Batch boundaries do not affect the result.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
	/// (n_examples, n_features)
	pub inputs: Array2<f32>,
	/// (n_examples), 0-indexed
	pub labels: Vec<usize>,
}

impl Batch {
	pub fn len(&self) -> usize {
		self.labels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}
}

/**
Reads a csv file with a header row and yields batches of up to `n_examples_per_batch` rows. One column holds the label as a 0-indexed class index. Every other column, in header order, is an input feature.
*/
pub struct CsvBatchSource<R>
where
	R: Read,
{
	reader: csv::Reader<R>,
	label_column_index: usize,
	n_features: usize,
	n_examples_per_batch: usize,
	column_names: Vec<String>,
	progress_counter: Option<ProgressCounter>,
	done: bool,
}

impl CsvBatchSource<File> {
	/// Open the csv file at `path`. The returned source advances a progress counter measured in bytes.
	pub fn from_path(
		path: &Path,
		label_column_name: &str,
		n_examples_per_batch: usize,
	) -> Result<Self> {
		let len = std::fs::metadata(path)
			.with_context(|| format!("failed to read {}", path.display()))?
			.len();
		let reader = csv::Reader::from_path(path)
			.with_context(|| format!("failed to open {}", path.display()))?;
		let mut source = Self::from_reader(reader, label_column_name, n_examples_per_batch)?;
		source.progress_counter = Some(ProgressCounter::new(len));
		Ok(source)
	}
}

impl<R> CsvBatchSource<R>
where
	R: Read,
{
	pub fn from_reader(
		mut reader: csv::Reader<R>,
		label_column_name: &str,
		n_examples_per_batch: usize,
	) -> Result<Self> {
		if n_examples_per_batch == 0 {
			return Err(format_err!("n_examples_per_batch must be greater than zero"));
		}
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let label_column_index = column_names
			.iter()
			.position(|column_name| column_name == label_column_name)
			.ok_or_else(|| format_err!("did not find label column \"{}\"", label_column_name))?;
		Ok(Self {
			reader,
			label_column_index,
			n_features: column_names.len() - 1,
			n_examples_per_batch,
			column_names,
			progress_counter: None,
			done: false,
		})
	}

	/// The number of columns other than the label column.
	pub fn n_features(&self) -> usize {
		self.n_features
	}

	pub fn progress_counter(&self) -> Option<&ProgressCounter> {
		self.progress_counter.as_ref()
	}

	fn read_batch(&mut self) -> Result<Option<Batch>> {
		let mut record = csv::StringRecord::new();
		let mut inputs: Vec<f32> = Vec::with_capacity(self.n_examples_per_batch * self.n_features);
		let mut labels: Vec<usize> = Vec::with_capacity(self.n_examples_per_batch);
		while labels.len() < self.n_examples_per_batch {
			if !self.reader.read_record(&mut record)? {
				self.done = true;
				break;
			}
			// The line in the file where this record starts, counting the header as line 1.
			let line = record.position().map_or(0, |position| position.line());
			for (column_index, value) in record.iter().enumerate() {
				let column_name = &self.column_names[column_index];
				if column_index == self.label_column_index {
					let label = value.trim().parse::<usize>().with_context(|| {
						format!(
							"invalid label \"{}\" on line {} column \"{}\"",
							value, line, column_name
						)
					})?;
					labels.push(label);
				} else {
					let value = value.trim().parse::<f32>().with_context(|| {
						format!(
							"invalid value \"{}\" on line {} column \"{}\"",
							value, line, column_name
						)
					})?;
					inputs.push(value);
				}
			}
		}
		if let Some(progress_counter) = self.progress_counter.as_ref() {
			progress_counter.set_position(self.reader.position().byte());
		}
		if labels.is_empty() {
			return Ok(None);
		}
		let inputs = Array2::from_shape_vec((labels.len(), self.n_features), inputs)?;
		log::debug!(
			"read batch of {} examples ending before line {}",
			labels.len(),
			self.reader.position().line(),
		);
		Ok(Some(Batch { inputs, labels }))
	}
}

impl<R> Iterator for CsvBatchSource<R>
where
	R: Read,
{
	type Item = Result<Batch>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		match self.read_batch() {
			Ok(Some(batch)) => Some(Ok(batch)),
			Ok(None) => None,
			Err(error) => {
				self.done = true;
				Some(Err(error))
			}
		}
	}
}
