/*!
This module runs a [`Model`](../model/trait.Model.html) over a stream of batches and accumulates top-1 and top-5 accuracy, either on the calling thread with [`evaluate`](fn.evaluate.html) or on a pool of workers with [`evaluate_parallel`](fn.evaluate_parallel.html).
*/

use crate::{batch::Batch, config::InvalidBatchPolicy, model::Model};
use anyhow::Result;
use rayon::prelude::*;
use scorecard_metrics::{AccuracyAccumulator, AccuracyAccumulatorInput, StreamingMetric};

#[derive(Clone, Debug)]
pub struct EvaluateOptions {
	pub on_invalid_batch: InvalidBatchPolicy,
	/// Only used by `evaluate_parallel`.
	pub n_threads: usize,
}

impl Default for EvaluateOptions {
	fn default() -> Self {
		Self {
			on_invalid_batch: InvalidBatchPolicy::default(),
			n_threads: 1,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EvaluateSummary {
	pub n_batches: u64,
	pub n_skipped_batches: u64,
}

impl EvaluateSummary {
	fn merge(&mut self, other: EvaluateSummary) {
		self.n_batches += other.n_batches;
		self.n_skipped_batches += other.n_skipped_batches;
	}
}

/// One worker's share of an evaluation. Workers never share an accumulator, they are merged when done.
struct Worker {
	accumulator: AccuracyAccumulator,
	summary: EvaluateSummary,
}

impl Worker {
	fn new(n_classes: usize) -> Worker {
		Worker {
			accumulator: AccuracyAccumulator::new(n_classes),
			summary: EvaluateSummary::default(),
		}
	}

	fn merge(&mut self, other: Worker) {
		self.accumulator.merge(other.accumulator);
		self.summary.merge(other.summary);
	}
}

/**
Run `model` over every batch and update `accumulator` with the predictions, one batch at a time on the calling thread.

An error from `batches` or from the model stops the evaluation and is returned unchanged. A batch rejected by the accumulator is handled according to `options.on_invalid_batch`. Batches processed before an error remain in `accumulator`.
*/
pub fn evaluate<I>(
	batches: I,
	model: &dyn Model,
	accumulator: &mut AccuracyAccumulator,
	options: &EvaluateOptions,
) -> Result<EvaluateSummary>
where
	I: Iterator<Item = Result<Batch>>,
{
	let mut summary = EvaluateSummary::default();
	for (batch_index, batch) in batches.enumerate() {
		let batch = batch?;
		evaluate_batch(
			batch_index,
			&batch,
			model,
			accumulator,
			&mut summary,
			options.on_invalid_batch,
		)?;
	}
	Ok(summary)
}

/**
Evaluate like [`evaluate`](fn.evaluate.html), but on a thread pool with `options.n_threads` threads. Each worker thread folds batches into its own accumulator and the workers are merged at the end, so the result is the same as evaluating sequentially.

`accumulator` is only updated if the whole evaluation succeeds.
*/
pub fn evaluate_parallel<I>(
	batches: I,
	model: &dyn Model,
	accumulator: &mut AccuracyAccumulator,
	options: &EvaluateOptions,
) -> Result<EvaluateSummary>
where
	I: Iterator<Item = Result<Batch>> + Send,
{
	let n_classes = accumulator.n_classes();
	let thread_pool = rayon::ThreadPoolBuilder::new()
		.num_threads(options.n_threads)
		.build()?;
	let worker = thread_pool.install(|| {
		batches
			.enumerate()
			.par_bridge()
			.try_fold(
				|| Worker::new(n_classes),
				|mut worker, (batch_index, batch)| -> Result<Worker> {
					let batch = batch?;
					evaluate_batch(
						batch_index,
						&batch,
						model,
						&mut worker.accumulator,
						&mut worker.summary,
						options.on_invalid_batch,
					)?;
					Ok(worker)
				},
			)
			.try_reduce(
				|| Worker::new(n_classes),
				|mut a, b| {
					a.merge(b);
					Ok(a)
				},
			)
	})?;
	accumulator.merge(worker.accumulator);
	Ok(worker.summary)
}

fn evaluate_batch(
	batch_index: usize,
	batch: &Batch,
	model: &dyn Model,
	accumulator: &mut AccuracyAccumulator,
	summary: &mut EvaluateSummary,
	on_invalid_batch: InvalidBatchPolicy,
) -> Result<()> {
	let predictions = model.predict(batch.inputs.view())?;
	let result = accumulator.update(AccuracyAccumulatorInput {
		predictions: predictions.view(),
		labels: batch.labels.as_slice().into(),
	});
	summary.n_batches += 1;
	match (result, on_invalid_batch) {
		(Ok(()), _) => {
			log::debug!("evaluated batch {} of {} examples", batch_index, batch.len());
		}
		(Err(error), InvalidBatchPolicy::Skip) => {
			log::warn!("skipping batch {}: {}", batch_index, error);
			summary.n_skipped_batches += 1;
		}
		(Err(error), InvalidBatchPolicy::Abort) => {
			return Err(anyhow::Error::new(error).context(format!("invalid batch {}", batch_index)));
		}
	}
	Ok(())
}
