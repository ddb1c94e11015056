use crate::{
	batch::CsvBatchSource,
	config::{self, Config},
	evaluate::{evaluate, evaluate_parallel, EvaluateOptions},
	model::{Linear, Model, Passthrough},
	progress::Progress,
};
use anyhow::{format_err, Context, Result};
use scorecard_metrics::{AccuracyAccumulator, AccuracyOutput, StreamingMetric};
use std::{
	io::Write,
	path::{Path, PathBuf},
};

#[derive(Debug, Default)]
pub struct RunOptions {
	/// The csv file to evaluate.
	pub file: PathBuf,
	/// The label column. Takes precedence over the config file.
	pub label_column: Option<String>,
	/// A linear model in json format. Without one, the feature columns are used as the scores.
	pub model: Option<PathBuf>,
	pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Report {
	pub n_examples: u64,
	#[serde(flatten)]
	pub accuracy: AccuracyOutput,
	pub n_batches: u64,
	pub n_skipped_batches: u64,
}

impl Report {
	pub fn to_path(&self, path: &Path) -> Result<()> {
		let file = std::fs::File::create(path)
			.with_context(|| format!("failed to create report file {}", path.display()))?;
		let mut writer = std::io::BufWriter::new(file);
		serde_json::to_writer_pretty(&mut writer, self)?;
		writer
			.flush()
			.with_context(|| format!("failed to write report file {}", path.display()))?;
		Ok(())
	}
}

/// Evaluate the model described by `options` over the csv file and report top-1 and top-5 accuracy.
pub fn run(options: &RunOptions, update_progress: &mut dyn FnMut(Progress)) -> Result<Report> {
	update_progress(Progress::Loading);
	let config = config::load_config(options.config.as_deref())?;
	let model: Box<dyn Model> = match options.model.as_deref() {
		Some(model_path) => Box::new(Linear::from_path(model_path)?),
		None => Box::new(Passthrough),
	};
	let label_column = options
		.label_column
		.as_deref()
		.or_else(|| config.label_column.as_deref())
		.unwrap_or(config::DEFAULT_LABEL_COLUMN);
	let n_examples_per_batch = config
		.n_examples_per_batch
		.unwrap_or(config::DEFAULT_N_EXAMPLES_PER_BATCH);
	let source = CsvBatchSource::from_path(&options.file, label_column, n_examples_per_batch)?;
	let n_classes = n_classes(&config, model.as_ref(), source.n_features())?;
	if let Some(progress_counter) = source.progress_counter() {
		update_progress(Progress::Evaluating(progress_counter.clone()));
	}
	let evaluate_options = EvaluateOptions {
		on_invalid_batch: config.on_invalid_batch.unwrap_or_default(),
		n_threads: config.n_threads.unwrap_or(1),
	};
	log::info!(
		"evaluating {} with {} classes, {} examples per batch, {} threads",
		options.file.display(),
		n_classes,
		n_examples_per_batch,
		evaluate_options.n_threads,
	);
	let mut accumulator = AccuracyAccumulator::new(n_classes);
	let summary = if evaluate_options.n_threads > 1 {
		evaluate_parallel(source, model.as_ref(), &mut accumulator, &evaluate_options)?
	} else {
		evaluate(source, model.as_ref(), &mut accumulator, &evaluate_options)?
	};
	let accuracy = accumulator.finalize()?;
	log::info!(
		"evaluated {} examples in {} batches, skipped {}",
		accumulator.n_examples(),
		summary.n_batches,
		summary.n_skipped_batches,
	);
	Ok(Report {
		n_examples: accumulator.n_examples(),
		accuracy,
		n_batches: summary.n_batches,
		n_skipped_batches: summary.n_skipped_batches,
	})
}

/// The config wins, then the model. A passthrough model scores one class per feature column.
fn n_classes(config: &Config, model: &dyn Model, n_features: usize) -> Result<usize> {
	let n_classes = config
		.n_classes
		.or_else(|| model.n_classes())
		.unwrap_or(n_features);
	if n_classes == 0 {
		return Err(format_err!("there must be at least one class"));
	}
	Ok(n_classes)
}
