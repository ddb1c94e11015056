//! This module contains the main entrypoint to the scorecard cli.

use self::progress_view::ProgressView;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

mod progress_view;

#[derive(Parser, Debug)]
#[clap(
	name = "scorecard",
	about = "Report the top-1 and top-5 accuracy of a classification model over a labeled dataset."
)]
struct Options {
	#[clap(short, long, help = "the path to a .csv file with one row per example")]
	file: PathBuf,
	#[clap(short, long, help = "the name of the column holding the 0-indexed class label")]
	target: Option<String>,
	#[clap(
		short,
		long,
		help = "the path to a linear model in .json format, otherwise the feature columns are the scores"
	)]
	model: Option<PathBuf>,
	#[clap(short, long, help = "the path to a config file")]
	config: Option<PathBuf>,
	#[clap(short, long, help = "the path to write a .json report to")]
	output: Option<PathBuf>,
	#[clap(long = "no-progress", help = "disable progress logging", parse(from_flag = std::ops::Not::not))]
	progress: bool,
}

fn main() {
	init_logger();
	let options = Options::parse();
	if let Err(error) = cli_evaluate(options) {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn init_logger() {
	let env = env_logger::Env::default().default_filter_or("scorecard=info");
	env_logger::Builder::from_env(env)
		.format_level(false)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
}

fn cli_evaluate(options: Options) -> Result<()> {
	let run_options = scorecard_core::RunOptions {
		file: options.file,
		label_column: options.target,
		model: options.model,
		config: options.config,
	};
	let report = {
		let mut progress_view = if options.progress {
			Some(ProgressView::new())
		} else {
			None
		};
		scorecard_core::run(&run_options, &mut |progress| {
			if let Some(progress_view) = progress_view.as_mut() {
				progress_view.update(progress)
			}
		})?
	};

	println!("top-1 accuracy: {:.2}%", report.accuracy.top1_accuracy * 100.0);
	println!("top-5 accuracy: {:.2}%", report.accuracy.top5_accuracy * 100.0);
	if report.n_skipped_batches > 0 {
		eprintln!(
			"{}: skipped {} of {} batches",
			"warning".yellow().bold(),
			report.n_skipped_batches,
			report.n_batches
		);
	}

	if let Some(output_path) = options.output {
		report.to_path(&output_path)?;
		eprintln!("The report was written to {}.", output_path.display());
	}

	Ok(())
}
