use thiserror::Error;

/// The reasons a batch passed to [`AccuracyAccumulator::update`](struct.AccuracyAccumulator.html#method.update) can be rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvalidBatchError {
	#[error("batch has {n_predictions} predictions but {n_labels} labels")]
	LengthMismatch {
		n_predictions: usize,
		n_labels: usize,
	},
	#[error("expected {expected} scores per prediction but got {actual}")]
	WrongNumberOfScores { expected: usize, actual: usize },
	#[error("label {label} of example {example_index} is out of range for {n_classes} classes")]
	LabelOutOfRange {
		example_index: usize,
		label: usize,
		n_classes: usize,
	},
	#[error("score for class {class_index} of example {example_index} is NaN")]
	NanScore {
		example_index: usize,
		class_index: usize,
	},
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("cannot finalize an accumulator that has seen no examples")]
pub struct EmptyAccumulatorError;
