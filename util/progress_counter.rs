use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};

/// Bytes of input consumed out of a known total. Clones share the position, so the batch source can advance it while the cli reports on it from another thread.
#[derive(Clone, Debug)]
pub struct ProgressCounter {
	position: Arc<AtomicU64>,
	len: u64,
}

impl ProgressCounter {
	pub fn new(len: u64) -> Self {
		Self {
			position: Arc::new(AtomicU64::new(0)),
			len,
		}
	}

	pub fn position(&self) -> u64 {
		self.position.load(Ordering::Relaxed)
	}

	pub fn set_position(&self, position: u64) {
		self.position.store(position, Ordering::Relaxed);
	}

	/// The fraction of the input consumed so far, or `None` if the input is empty.
	pub fn fraction(&self) -> Option<f64> {
		if self.len == 0 {
			None
		} else {
			Some((self.position() as f64 / self.len as f64).min(1.0))
		}
	}
}

#[test]
fn test_position_is_shared_between_clones() {
	let counter = ProgressCounter::new(200);
	let clone = counter.clone();
	assert_eq!(counter.fraction(), Some(0.0));
	clone.set_position(50);
	assert_eq!(counter.position(), 50);
	assert_eq!(counter.fraction(), Some(0.25));
	counter.set_position(500);
	assert_eq!(clone.fraction(), Some(1.0));
	assert_eq!(ProgressCounter::new(0).fraction(), None);
}
