use scorecard_util::progress_counter::ProgressCounter;

#[derive(Debug)]
pub enum Progress {
	Loading,
	/// The counter measures bytes of the input file consumed so far.
	Evaluating(ProgressCounter),
}
