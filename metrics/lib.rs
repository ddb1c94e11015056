/*!
This crate defines the [`StreamingMetric`](trait.StreamingMetric.html) trait and the [`AccuracyAccumulator`](struct.AccuracyAccumulator.html), which computes top-1 and top-5 accuracy over a stream of batched class scores and labels.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod accuracy;
mod error;
mod rank;

pub use self::accuracy::{
	AccuracyAccumulator, AccuracyAccumulatorInput, AccuracyOutput, TOP_K,
};
pub use self::error::{EmptyAccumulatorError, InvalidBatchError};
pub use self::rank::label_rank;

/**
The `StreamingMetric` trait defines a common interface to metrics that can be computed in a streaming manner, where the input is available in chunks, such as top-k accuracy.

After being initialized, a value of type `T` implementing the `StreamingMetric` trait can have `update()` called on it with values of the associated type `Input`. A call to `update()` either applies the whole input or, if it returns an error, leaves the metric untouched. Multiple values of `T` can be merged together by calling `merge()`. This is useful when computing a metric across multiple threads. `finalize()` borrows the metric, so it can be called as many times as you like to report intermediate results.

# Examples

Here is a basic example implementation of a `Min` metric, which takes `f32`s as input and produces an `f32` as output that is the minimum of all the inputs.

```
use scorecard_metrics::StreamingMetric;

struct Min(f32);

impl StreamingMetric<'_> for Min {
	type Input = f32;
	type Output = f32;
	type Error = std::convert::Infallible;
	fn update(&mut self, input: Self::Input) -> Result<(), Self::Error> {
		self.0 = self.0.min(input);
		Ok(())
	}
	fn merge(&mut self, other: Self) { self.0 = self.0.min(other.0) }
	fn reset(&mut self) { self.0 = std::f32::INFINITY }
	fn finalize(&self) -> Self::Output { self.0 }
}
```

The seemingly unused generic lifetime `'a` exists here to allow `Input`s to borrow from their enclosing scope.
*/
pub trait StreamingMetric<'a> {
	/// `Input` is the type to aggregate in calls to `update()`.
	type Input;
	/// `Output` is the return type of `finalize()`.
	type Output;
	/// `Error` is returned by `update()` when the input is rejected.
	type Error;
	/// Update this streaming metric with the `Input` `input`.
	fn update(&mut self, input: Self::Input) -> Result<(), Self::Error>;
	/// Merge multiple independently computed streaming metrics.
	fn merge(&mut self, other: Self);
	/// Return this streaming metric to its initial state.
	fn reset(&mut self);
	/// Produce an `Output` from the inputs aggregated so far.
	fn finalize(&self) -> Self::Output;
}
