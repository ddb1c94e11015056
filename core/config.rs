/*!
This module defines the `Config` struct, which is used to configure an evaluation run with [`run`](../fn.run.html).
*/

use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_LABEL_COLUMN: &str = "label";
pub const DEFAULT_N_EXAMPLES_PER_BATCH: usize = 256;

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub label_column: Option<String>,
	pub n_classes: Option<usize>,
	pub n_examples_per_batch: Option<usize>,
	pub n_threads: Option<usize>,
	pub on_invalid_batch: Option<InvalidBatchPolicy>,
}

/// What to do when a batch is rejected by the accumulator.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub enum InvalidBatchPolicy {
	/// Log the batch, count it as skipped, and keep going.
	#[serde(rename = "skip")]
	Skip,
	#[serde(rename = "abort")]
	Abort,
}

impl Default for InvalidBatchPolicy {
	fn default() -> Self {
		InvalidBatchPolicy::Abort
	}
}

impl Config {
	pub fn from_path(config_path: &Path) -> Result<Config> {
		let config = std::fs::read_to_string(config_path)
			.with_context(|| format!("failed to read config file {}", config_path.display()))?;
		Self::from_yaml(&config)
			.with_context(|| format!("failed to parse config file {}", config_path.display()))
	}

	pub fn from_yaml(config: &str) -> Result<Config> {
		let config = serde_yaml::from_str(config)?;
		Ok(config)
	}
}

pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
	match config_path {
		Some(config_path) => Config::from_path(config_path),
		None => Ok(Config::default()),
	}
}

#[test]
fn test_parse_config() {
	let config = Config::from_yaml(
		"
label_column: class
n_classes: 1000
n_examples_per_batch: 64
n_threads: 4
on_invalid_batch: skip
",
	)
	.unwrap();
	insta::assert_debug_snapshot!(config, @r###"
 Config {
     label_column: Some(
         "class",
     ),
     n_classes: Some(
         1000,
     ),
     n_examples_per_batch: Some(
         64,
     ),
     n_threads: Some(
         4,
     ),
     on_invalid_batch: Some(
         Skip,
     ),
 }
 "###);
}

#[test]
fn test_reject_unknown_fields() {
	assert!(Config::from_yaml("batch_size: 10").is_err());
	assert!(Config::from_yaml("on_invalid_batch: retry").is_err());
}
