use super::{label_rank, EmptyAccumulatorError, InvalidBatchError, StreamingMetric};
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// The `k` in top-k accuracy tracked alongside top-1.
pub const TOP_K: usize = 5;

/**
`AccuracyAccumulator` counts how many examples had the label ranked first (top-1) and how many had it ranked among the first [`TOP_K`](constant.TOP_K.html) (top-5) as batches of predictions stream in.

Ranking is done by [`label_rank`](fn.label_rank.html): classes are ordered by descending score and ties go to the lowest class index. Because each example is counted independently, the result does not depend on how the examples are split into batches.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct AccuracyAccumulator {
	n_classes: usize,
	top1_correct: u64,
	top5_correct: u64,
	n_examples: u64,
}

/// The input to [AccuracyAccumulator](struct.AccuracyAccumulator.html).
pub struct AccuracyAccumulatorInput<'a> {
	/// (n_examples, n_classes)
	pub predictions: ArrayView2<'a, f32>,
	/// (n_examples), 0-indexed
	pub labels: ArrayView1<'a, usize>,
}

/// The output from [AccuracyAccumulator](struct.AccuracyAccumulator.html).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AccuracyOutput {
	pub top1_accuracy: f32,
	pub top5_accuracy: f32,
}

impl AccuracyAccumulator {
	pub fn new(n_classes: usize) -> Self {
		Self {
			n_classes,
			top1_correct: 0,
			top5_correct: 0,
			n_examples: 0,
		}
	}

	pub fn n_classes(&self) -> usize {
		self.n_classes
	}

	pub fn n_examples(&self) -> u64 {
		self.n_examples
	}

	pub fn top1_correct(&self) -> u64 {
		self.top1_correct
	}

	pub fn top5_correct(&self) -> u64 {
		self.top5_correct
	}

	fn validate(&self, input: &AccuracyAccumulatorInput) -> Result<(), InvalidBatchError> {
		let n_predictions = input.predictions.nrows();
		let n_labels = input.labels.len();
		if n_predictions != n_labels {
			return Err(InvalidBatchError::LengthMismatch {
				n_predictions,
				n_labels,
			});
		}
		if input.predictions.ncols() != self.n_classes {
			return Err(InvalidBatchError::WrongNumberOfScores {
				expected: self.n_classes,
				actual: input.predictions.ncols(),
			});
		}
		for (example_index, &label) in input.labels.iter().enumerate() {
			if label >= self.n_classes {
				return Err(InvalidBatchError::LabelOutOfRange {
					example_index,
					label,
					n_classes: self.n_classes,
				});
			}
		}
		for ((example_index, class_index), score) in input.predictions.indexed_iter() {
			if score.is_nan() {
				return Err(InvalidBatchError::NanScore {
					example_index,
					class_index,
				});
			}
		}
		Ok(())
	}
}

impl<'a> StreamingMetric<'a> for AccuracyAccumulator {
	type Input = AccuracyAccumulatorInput<'a>;
	type Output = Result<AccuracyOutput, EmptyAccumulatorError>;
	type Error = InvalidBatchError;

	fn update(&mut self, input: Self::Input) -> Result<(), InvalidBatchError> {
		// Reject the whole batch before touching any counter.
		self.validate(&input)?;
		let mut top1_correct = 0;
		let mut top5_correct = 0;
		for (scores, &label) in input.predictions.outer_iter().zip(input.labels.iter()) {
			let rank = label_rank(scores, label);
			if rank == 0 {
				top1_correct += 1;
			}
			if rank < TOP_K {
				top5_correct += 1;
			}
		}
		self.top1_correct += top1_correct;
		self.top5_correct += top5_correct;
		self.n_examples += input.labels.len().to_u64().unwrap();
		Ok(())
	}

	fn merge(&mut self, other: Self) {
		assert_eq!(
			self.n_classes, other.n_classes,
			"cannot merge accuracy accumulators with different numbers of classes"
		);
		self.top1_correct += other.top1_correct;
		self.top5_correct += other.top5_correct;
		self.n_examples += other.n_examples;
	}

	fn reset(&mut self) {
		*self = Self::new(self.n_classes);
	}

	fn finalize(&self) -> Result<AccuracyOutput, EmptyAccumulatorError> {
		if self.n_examples == 0 {
			return Err(EmptyAccumulatorError);
		}
		let n_examples = self.n_examples.to_f64().unwrap();
		Ok(AccuracyOutput {
			top1_accuracy: (self.top1_correct.to_f64().unwrap() / n_examples) as f32,
			top5_accuracy: (self.top5_correct.to_f64().unwrap() / n_examples) as f32,
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rand::{Rng, SeedableRng};
	use rand_xoshiro::Xoshiro256Plus;

	fn update(
		accumulator: &mut AccuracyAccumulator,
		predictions: &Array2<f32>,
		labels: &[usize],
	) -> Result<(), InvalidBatchError> {
		accumulator.update(AccuracyAccumulatorInput {
			predictions: predictions.view(),
			labels: labels.into(),
		})
	}

	fn random_dataset(n_examples: usize, n_classes: usize, seed: u64) -> (Array2<f32>, Vec<usize>) {
		let mut rng = Xoshiro256Plus::seed_from_u64(seed);
		// Coarse scores so that ties occur.
		let predictions =
			Array2::from_shape_fn((n_examples, n_classes), |_| rng.gen_range(0, 8) as f32 / 8.0);
		let labels = (0..n_examples)
			.map(|_| rng.gen_range(0, n_classes))
			.collect();
		(predictions, labels)
	}

	#[test]
	fn test_fewer_than_five_classes() {
		let mut accumulator = AccuracyAccumulator::new(5);
		let predictions = arr2(&[[0.1, 0.9, 0.2, 0.05, 0.05]]);
		update(&mut accumulator, &predictions, &[1]).unwrap();
		assert_eq!(
			accumulator.finalize(),
			Ok(AccuracyOutput {
				top1_accuracy: 1.0,
				top5_accuracy: 1.0,
			})
		);
		let predictions = arr2(&[[0.1, 0.9, 0.2, 0.05, 0.05]]);
		update(&mut accumulator, &predictions, &[4]).unwrap();
		assert_eq!(accumulator.top1_correct(), 1);
		assert_eq!(accumulator.top5_correct(), 2);
	}

	#[test]
	fn test_ten_classes_with_ties() {
		let mut accumulator = AccuracyAccumulator::new(10);
		let predictions = arr2(&[
			[0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.55],
			[0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.55],
			[0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.55],
		]);
		// Label 3 ranks behind 9, 0, 1 and 2. Label 4 ranks sixth. Label 9 is first.
		update(&mut accumulator, &predictions, &[3, 4, 9]).unwrap();
		insta::assert_debug_snapshot!(accumulator, @r###"
  AccuracyAccumulator {
      n_classes: 10,
      top1_correct: 1,
      top5_correct: 2,
      n_examples: 3,
  }
  "###);
	}

	#[test]
	fn test_invalid_batches_leave_state_unchanged() {
		let mut accumulator = AccuracyAccumulator::new(3);
		update(&mut accumulator, &arr2(&[[0.2, 0.5, 0.3]]), &[1]).unwrap();
		let before = accumulator.clone();
		assert_eq!(
			update(&mut accumulator, &arr2(&[[0.2, 0.5, 0.3]]), &[1, 2]),
			Err(InvalidBatchError::LengthMismatch {
				n_predictions: 1,
				n_labels: 2,
			})
		);
		assert_eq!(
			update(&mut accumulator, &arr2(&[[0.2, 0.5, 0.3, 0.0]]), &[1]),
			Err(InvalidBatchError::WrongNumberOfScores {
				expected: 3,
				actual: 4,
			})
		);
		assert_eq!(
			update(
				&mut accumulator,
				&arr2(&[[0.2, 0.5, 0.3], [0.2, 0.5, 0.3]]),
				&[0, 3]
			),
			Err(InvalidBatchError::LabelOutOfRange {
				example_index: 1,
				label: 3,
				n_classes: 3,
			})
		);
		assert_eq!(
			update(
				&mut accumulator,
				&arr2(&[[0.2, 0.5, 0.3], [0.2, std::f32::NAN, 0.3]]),
				&[1, 1]
			),
			Err(InvalidBatchError::NanScore {
				example_index: 1,
				class_index: 1,
			})
		);
		assert_eq!(accumulator, before);
	}

	#[test]
	fn test_empty_batch_is_a_no_op() {
		let mut accumulator = AccuracyAccumulator::new(3);
		update(&mut accumulator, &Array2::zeros((0, 3)), &[]).unwrap();
		assert_eq!(accumulator, AccuracyAccumulator::new(3));
	}

	#[test]
	fn test_finalize_empty() {
		let accumulator = AccuracyAccumulator::new(1000);
		assert_eq!(accumulator.finalize(), Err(EmptyAccumulatorError));
	}

	#[test]
	fn test_finalize_is_idempotent() {
		let (predictions, labels) = random_dataset(100, 20, 0);
		let mut accumulator = AccuracyAccumulator::new(20);
		update(&mut accumulator, &predictions, &labels).unwrap();
		let first = accumulator.finalize().unwrap();
		let second = accumulator.finalize().unwrap();
		assert_eq!(first, second);
		assert_eq!(accumulator.n_examples(), 100);
	}

	#[test]
	fn test_reset() {
		let (predictions, labels) = random_dataset(10, 7, 1);
		let mut accumulator = AccuracyAccumulator::new(7);
		update(&mut accumulator, &predictions, &labels).unwrap();
		accumulator.reset();
		assert_eq!(accumulator, AccuracyAccumulator::new(7));
		assert_eq!(accumulator.finalize(), Err(EmptyAccumulatorError));
	}

	#[test]
	fn test_batch_size_invariance() {
		let n_examples = 257;
		let (predictions, labels) = random_dataset(n_examples, 12, 2);
		let mut whole = AccuracyAccumulator::new(12);
		update(&mut whole, &predictions, &labels).unwrap();
		for &n_examples_per_batch in &[1, 7, 128, 1000] {
			let mut chunked = AccuracyAccumulator::new(12);
			for (predictions, labels) in predictions
				.axis_chunks_iter(Axis(0), n_examples_per_batch)
				.zip(labels.chunks(n_examples_per_batch))
			{
				chunked
					.update(AccuracyAccumulatorInput {
						predictions,
						labels: labels.into(),
					})
					.unwrap();
			}
			assert_eq!(chunked, whole);
			assert_eq!(chunked.finalize(), whole.finalize());
		}
	}

	#[test]
	fn test_merge() {
		let (predictions, labels) = random_dataset(300, 15, 3);
		let mut whole = AccuracyAccumulator::new(15);
		update(&mut whole, &predictions, &labels).unwrap();
		let (predictions_a, predictions_b) = predictions.view().split_at(Axis(0), 120);
		let (labels_a, labels_b) = labels.split_at(120);
		let mut a = AccuracyAccumulator::new(15);
		a.update(AccuracyAccumulatorInput {
			predictions: predictions_a,
			labels: labels_a.into(),
		})
		.unwrap();
		let mut b = AccuracyAccumulator::new(15);
		b.update(AccuracyAccumulatorInput {
			predictions: predictions_b,
			labels: labels_b.into(),
		})
		.unwrap();
		a.merge(b);
		assert_eq!(a, whole);
		assert_eq!(a.finalize(), whole.finalize());
	}

	#[test]
	#[should_panic]
	fn test_merge_different_n_classes() {
		let mut a = AccuracyAccumulator::new(3);
		a.merge(AccuracyAccumulator::new(4));
	}
}
