use ndarray::prelude::*;

/**
Compute the 0-based position of class `label` when the classes in `scores` are ordered by descending score. Equal scores are ordered by ascending class index, so among tied classes the lowest index ranks first.

`label` is in the top k iff `label_rank(scores, label) < k`. This counts instead of sorting, so it runs in a single pass over `scores`. The caller must ensure that `label < scores.len()` and that no score is NaN.
*/
pub fn label_rank(scores: ArrayView1<f32>, label: usize) -> usize {
	let label_score = scores[label];
	scores
		.iter()
		.enumerate()
		.filter(|&(class_index, &score)| {
			score > label_score || (score == label_score && class_index < label)
		})
		.count()
}

#[cfg(test)]
mod test {
	use super::*;
	use rand::{Rng, SeedableRng};
	use rand_xoshiro::Xoshiro256Plus;
	use std::cmp::Ordering;

	fn brute_force_rank(scores: &[f32], label: usize) -> usize {
		let mut class_indexes: Vec<usize> = (0..scores.len()).collect();
		class_indexes.sort_by(|&a, &b| {
			scores[b]
				.partial_cmp(&scores[a])
				.unwrap_or(Ordering::Equal)
				.then(a.cmp(&b))
		});
		class_indexes
			.iter()
			.position(|&class_index| class_index == label)
			.unwrap()
	}

	#[test]
	fn test_highest_score_ranks_first() {
		let scores = arr1(&[0.1, 0.9, 0.2, 0.05, 0.05]);
		assert_eq!(label_rank(scores.view(), 1), 0);
		assert_eq!(label_rank(scores.view(), 2), 1);
		assert_eq!(label_rank(scores.view(), 0), 2);
	}

	#[test]
	fn test_ties_favor_lowest_index() {
		let scores = arr1(&[0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.55]);
		assert_eq!(label_rank(scores.view(), 9), 0);
		assert_eq!(label_rank(scores.view(), 0), 1);
		assert_eq!(label_rank(scores.view(), 3), 4);
		assert_eq!(label_rank(scores.view(), 4), 5);
		assert_eq!(label_rank(scores.view(), 8), 9);
	}

	#[test]
	fn test_signed_zeros_and_infinities() {
		let scores = arr1(&[0.0, -0.0, std::f32::INFINITY, std::f32::NEG_INFINITY]);
		assert_eq!(label_rank(scores.view(), 2), 0);
		assert_eq!(label_rank(scores.view(), 0), 1);
		assert_eq!(label_rank(scores.view(), 1), 2);
		assert_eq!(label_rank(scores.view(), 3), 3);
	}

	#[test]
	fn test_matches_sort() {
		let mut rng = Xoshiro256Plus::seed_from_u64(42);
		for _ in 0..200 {
			let n_classes = rng.gen_range(1, 20);
			// Draw from a handful of values so ties are common.
			let scores: Vec<f32> = (0..n_classes)
				.map(|_| rng.gen_range(0, 4) as f32 * 0.25)
				.collect();
			for label in 0..n_classes {
				assert_eq!(
					label_rank(ArrayView1::from(scores.as_slice()), label),
					brute_force_rank(&scores, label),
				);
			}
		}
	}
}
