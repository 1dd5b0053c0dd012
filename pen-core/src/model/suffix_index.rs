use std::cmp::Ordering;
use std::sync::mpsc;
use std::thread;

use crate::model::comparer::Comparer;
use crate::model::corpus::{Corpus, Token};

/// Corpora below this size are sorted on the calling thread.
const PARALLEL_THRESHOLD: usize = 8192;

/// The contiguous block of index slots matching a sample window.
///
/// When `count` is zero, `first` is the insertion point: the slot where the
/// sample would sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located {
	pub first: usize,
	pub count: usize,
}

/// A permutation of corpus positions sorted by extended suffix order.
///
/// # Responsibilities
/// - Sort every corpus position by the token sequence starting there
/// - Locate the slot range whose positions match a cyclic sample window
///
/// # Invariants
/// - `slots` is a permutation of `[0, N)` for a corpus of `N` tokens
/// - For all `i < j`, the extended suffix comparison of `slots[i]`
///   against `slots[j]` is never `Greater`
///
/// The build is a comparison sort whose comparator walks token pairs, so
/// the worst case is `O(N² log N)` token comparisons. Accepted: corpora are
/// modest and the index is built once per `Pen`.
#[derive(Clone, Debug)]
pub(crate) struct SuffixIndex {
	slots: Vec<usize>,
}

impl SuffixIndex {
	/// Sorts all corpus positions by extended suffix order.
	///
	/// Large corpora are split into position chunks sorted on worker
	/// threads and merged back together; the order is total, so merging
	/// sorted runs in any order yields the same permutation.
	pub(crate) fn build(corpus: &Corpus, comparer: &dyn Comparer) -> Self {
		if corpus.len() < PARALLEL_THRESHOLD {
			Self::build_sequential(corpus, comparer)
		} else {
			Self::build_parallel(corpus, comparer)
		}
	}

	fn build_sequential(corpus: &Corpus, comparer: &dyn Comparer) -> Self {
		let mut slots: Vec<usize> = (0..corpus.len()).collect();
		slots.sort_unstable_by(|&x, &y| suffix_compare(corpus, comparer, x, y));
		Self { slots }
	}

	fn build_parallel(corpus: &Corpus, comparer: &dyn Comparer) -> Self {
		let cpus = num_cpus::get().max(1);
		let chunk_size = corpus.len().div_ceil(cpus);
		log::debug!(
			"sorting {} positions on {} threads (chunk size {})",
			corpus.len(),
			cpus,
			chunk_size
		);

		let runs = thread::scope(|scope| {
			let (tx, rx) = mpsc::channel();
			let positions: Vec<usize> = (0..corpus.len()).collect();
			for chunk in positions.chunks(chunk_size) {
				let tx = tx.clone();
				let mut run = chunk.to_vec();
				scope.spawn(move || {
					run.sort_unstable_by(|&x, &y| suffix_compare(corpus, comparer, x, y));
					tx.send(run).expect("Failed to send from thread");
				});
			}
			drop(tx);
			rx.iter().collect::<Vec<_>>()
		});

		let slots = runs
			.into_iter()
			.fold(Vec::new(), |merged, run| merge_runs(corpus, comparer, merged, run));
		Self { slots }
	}

	/// Corpus position stored in `slot`.
	pub(crate) fn position(&self, slot: usize) -> usize {
		self.slots[slot]
	}

	/// The raw permutation, for snapshots.
	pub(crate) fn slots(&self) -> &[usize] {
		&self.slots
	}

	/// Wraps an already-sorted permutation (snapshot decode path).
	///
	/// The caller vouches that `slots` genuinely sorts the corpus under the
	/// comparer it will be used with; this is not re-validated.
	pub(crate) fn from_slots(slots: Vec<usize>) -> Self {
		Self { slots }
	}

	/// Finds the slot range matching a cyclic sample window.
	///
	/// # Parameters
	/// - `sample`: backing buffer of the window; its logical content starts
	///   at `cycle_start` and wraps around the buffer end.
	/// - `bounds`: optional prior `[lo, hi)` slot range known to bracket at
	///   least one match. `None` searches the full index.
	///
	/// # Behavior
	/// Binary search with a three-way range comparator. On hitting an equal
	/// slot, expand linearly left and right while the comparator stays
	/// equal: matches are contiguous by construction of the suffix order,
	/// so the expansion captures the whole block. Without a hit the
	/// returned `first` is the insertion point and `count` is zero.
	///
	/// An empty sample matches in front of every position.
	///
	/// # Notes
	/// Preconditions (valid permutation, truthful `bounds`, `cycle_start`
	/// inside the buffer) are a usage contract and are not re-validated;
	/// violating them gives undefined but non-corrupting results.
	///
	/// Cost: `O(log N · |sample|)` for the search plus
	/// `O(count · |sample|)` for the expansion.
	pub(crate) fn locate(
		&self,
		corpus: &Corpus,
		comparer: &dyn Comparer,
		sample: &[Token],
		cycle_start: usize,
		bounds: Option<(usize, usize)>,
	) -> Located {
		let (mut lo, mut hi) = bounds.unwrap_or((0, self.slots.len()));
		let mut hit = None;

		while lo < hi {
			let mid = lo + (hi - lo) / 2;
			match compare_range(corpus, comparer, self.slots[mid], sample, cycle_start) {
				Ordering::Less => lo = mid + 1,
				Ordering::Greater => hi = mid,
				Ordering::Equal => {
					hit = Some(mid);
					break;
				}
			}
		}

		let Some(mid) = hit else {
			return Located { first: lo, count: 0 };
		};

		// The block may extend past the given bounds; expand over the whole
		// index so the count stays exact.
		let mut first = mid;
		while first > 0
			&& compare_range(corpus, comparer, self.slots[first - 1], sample, cycle_start)
				== Ordering::Equal
		{
			first -= 1;
		}
		let mut last = mid + 1;
		while last < self.slots.len()
			&& compare_range(corpus, comparer, self.slots[last], sample, cycle_start)
				== Ordering::Equal
		{
			last += 1;
		}

		Located { first, count: last - first }
	}
}

/// Extended suffix comparison of two corpus positions.
///
/// Token pairs are compared starting at `x` and `y` until one differs or a
/// side runs off the corpus end. The side exhausted first sorts strictly
/// less: a corpus boundary sorts before any real token. Both sides run out
/// simultaneously only when `x == y`.
pub(crate) fn suffix_compare(
	corpus: &Corpus,
	comparer: &dyn Comparer,
	x: usize,
	y: usize,
) -> Ordering {
	let tokens = corpus.tokens();
	let length = tokens.len();
	let (mut i, mut j) = (x, y);

	while i < length && j < length {
		let ordering = comparer.compare(tokens[i].as_deref(), tokens[j].as_deref());
		if ordering != Ordering::Equal {
			return ordering;
		}
		i += 1;
		j += 1;
	}

	// Shorter suffix first; equal lengths can only mean the same position.
	(length - x).cmp(&(length - y))
}

/// Three-way comparison of the corpus tokens starting at `position` against
/// a cyclic sample window.
///
/// Stops early with `Less` when the corpus runs out before the sample does:
/// shorter real-data sequences sort before a sample extending past them.
fn compare_range(
	corpus: &Corpus,
	comparer: &dyn Comparer,
	position: usize,
	sample: &[Token],
	cycle_start: usize,
) -> Ordering {
	let tokens = corpus.tokens();
	let mut at = position;

	for step in 0..sample.len() {
		if at >= tokens.len() {
			return Ordering::Less;
		}
		let expected = &sample[(cycle_start + step) % sample.len()];
		let ordering = comparer.compare(tokens[at].as_deref(), expected.as_deref());
		if ordering != Ordering::Equal {
			return ordering;
		}
		at += 1;
	}

	Ordering::Equal
}

/// Merges two runs already sorted by the suffix order.
fn merge_runs(
	corpus: &Corpus,
	comparer: &dyn Comparer,
	a: Vec<usize>,
	b: Vec<usize>,
) -> Vec<usize> {
	let mut merged = Vec::with_capacity(a.len() + b.len());
	let (mut i, mut j) = (0, 0);

	while i < a.len() && j < b.len() {
		if suffix_compare(corpus, comparer, a[i], b[j]) == Ordering::Greater {
			merged.push(b[j]);
			j += 1;
		} else {
			merged.push(a[i]);
			i += 1;
		}
	}
	merged.extend_from_slice(&a[i..]);
	merged.extend_from_slice(&b[j..]);
	merged
}
