use scorecard_core::progress::Progress;
use std::{
	sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
	thread::{spawn, JoinHandle},
	time::Duration,
};

const LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Logs the most recent progress update once per `LOG_INTERVAL` from a background thread. Dropping the view stops the thread.
pub struct ProgressView {
	thread: Option<JoinHandle<()>>,
	sender: Option<Sender<Option<Progress>>>,
}

impl ProgressView {
	pub fn new() -> Self {
		let (sender, receiver) = channel::<Option<Progress>>();
		let thread = Some(spawn(move || thread_main(receiver)));
		Self {
			thread,
			sender: Some(sender),
		}
	}

	pub fn update(&mut self, progress: Progress) {
		if let Some(sender) = self.sender.as_ref() {
			sender.send(Some(progress)).ok();
		}
	}
}

impl Drop for ProgressView {
	fn drop(&mut self) {
		if let Some(sender) = self.sender.take() {
			sender.send(None).ok();
		}
		if let Some(thread) = self.thread.take() {
			thread.join().ok();
		}
	}
}

fn thread_main(receiver: Receiver<Option<Progress>>) {
	let mut progress = None;
	loop {
		match receiver.recv_timeout(LOG_INTERVAL) {
			Err(RecvTimeoutError::Timeout) => {}
			Err(RecvTimeoutError::Disconnected) | Ok(None) => break,
			Ok(Some(new_progress)) => progress = Some(new_progress),
		};
		match progress.as_ref() {
			Some(Progress::Loading) => log::info!("loading"),
			Some(Progress::Evaluating(progress_counter)) => {
				if let Some(fraction) = progress_counter.fraction() {
					log::info!("evaluating {:.0}%", fraction * 100.0);
				}
			}
			None => {}
		}
	}
}
