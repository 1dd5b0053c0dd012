use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Process-wide counter handing each thread a distinct seed lane.
static NEXT_LANE: AtomicU64 = AtomicU64::new(0);

thread_local! {
	static THREAD_RNG: RefCell<StdRng> = RefCell::new(seeded_rng());
}

fn seeded_rng() -> StdRng {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_nanos() as u64)
		.unwrap_or(0);
	let lane = NEXT_LANE.fetch_add(1, Ordering::Relaxed);
	StdRng::seed_from_u64(nanos ^ lane.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// The convenience picker used when the caller supplies no explicit one.
///
/// Returns a uniform value in `[0, max(candidates, 1))` from a per-thread
/// RNG, so concurrent renders never contend on shared state. Callers who
/// need determinism pass their own picker instead.
pub fn random_pick(candidates: usize) -> usize {
	if candidates == 0 {
		return 0;
	}
	THREAD_RNG.with(|rng| rng.borrow_mut().random_range(0..candidates))
}
