/*!
This module defines the [`Model`](trait.Model.html) trait, which maps a batch of inputs to a batch of class scores, and the executors that implement it.
*/

use anyhow::{format_err, Context, Result};
use ndarray::prelude::*;
use std::path::Path;

/// A frozen mapping from inputs to class scores. `predict` is called from multiple threads during parallel evaluation.
pub trait Model: Sync {
	/// The number of classes this model scores, if it is fixed by the model itself.
	fn n_classes(&self) -> Option<usize>;
	/// Map `inputs` with shape (n_examples, n_features) to scores with shape (n_examples, n_classes).
	fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>>;
}

/// The inputs already are class scores, for example logits written out by another runtime.
#[derive(Debug, Default)]
pub struct Passthrough;

impl Model for Passthrough {
	fn n_classes(&self) -> Option<usize> {
		None
	}

	fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
		Ok(inputs.to_owned())
	}
}

/// A dense layer with no activation. The scores are `inputs · weights + biases`.
#[derive(Debug)]
pub struct Linear {
	/// (n_features, n_classes)
	weights: Array2<f32>,
	/// (n_classes)
	biases: Array1<f32>,
}

#[derive(serde::Deserialize)]
struct LinearFile {
	weights: Vec<Vec<f32>>,
	biases: Vec<f32>,
}

impl Linear {
	pub fn new(weights: Array2<f32>, biases: Array1<f32>) -> Result<Linear> {
		if weights.ncols() != biases.len() {
			return Err(format_err!(
				"weights have {} columns but there are {} biases",
				weights.ncols(),
				biases.len()
			));
		}
		Ok(Linear { weights, biases })
	}

	/// Read a model from a json file of the form `{ "weights": [[...], ...], "biases": [...] }`, where `weights` has one row per feature.
	pub fn from_path(path: &Path) -> Result<Linear> {
		let file = std::fs::File::open(path)
			.with_context(|| format!("failed to open model file {}", path.display()))?;
		let reader = std::io::BufReader::new(file);
		let model: LinearFile = serde_json::from_reader(reader)
			.with_context(|| format!("failed to parse model file {}", path.display()))?;
		Self::from_file(model)
	}

	pub fn from_slice(slice: &[u8]) -> Result<Linear> {
		let model: LinearFile = serde_json::from_slice(slice)?;
		Self::from_file(model)
	}

	fn from_file(model: LinearFile) -> Result<Linear> {
		let n_features = model.weights.len();
		let n_classes = model.biases.len();
		if let Some((row_index, row)) = model
			.weights
			.iter()
			.enumerate()
			.find(|(_, row)| row.len() != n_classes)
		{
			return Err(format_err!(
				"weights row {} has {} entries but there are {} biases",
				row_index,
				row.len(),
				n_classes
			));
		}
		let weights = Array2::from_shape_vec(
			(n_features, n_classes),
			model.weights.into_iter().flatten().collect(),
		)?;
		Self::new(weights, model.biases.into())
	}

	pub fn n_features(&self) -> usize {
		self.weights.nrows()
	}
}

impl Model for Linear {
	fn n_classes(&self) -> Option<usize> {
		Some(self.biases.len())
	}

	fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
		if inputs.ncols() != self.n_features() {
			return Err(format_err!(
				"model expects {} features but the inputs have {}",
				self.n_features(),
				inputs.ncols()
			));
		}
		let mut scores = Array2::zeros((inputs.nrows(), self.biases.len()));
		for mut row in scores.outer_iter_mut() {
			row.assign(&self.biases);
		}
		ndarray::linalg::general_mat_mul(1.0, &inputs, &self.weights, 1.0, &mut scores);
		Ok(scores)
	}
}
