use crate::model::corpus::Token;
use crate::model::error::PenError;
use crate::model::pen::Pen;

/// Internal render phases.
///
/// `Seeding` copies tokens straight out of the corpus from a caller-chosen
/// position; `FirstToken` draws the opening token uniformly over the whole
/// corpus plus the virtual end slot; `Streaming` repeats the locate/pick
/// step; `Done` is terminal.
enum Phase {
	Seeding { position: usize, remaining: usize },
	FirstToken,
	Streaming,
	Done,
}

/// A single render request: a forward-only, lazily-pulled token sequence.
///
/// # Responsibilities
/// - Hold the ring buffer of the last `window` emitted tokens
/// - Drive the pattern locator once per emitted token
/// - Map picker results onto corpus positions, or terminate
///
/// No work happens until `next` is called, and abandoning the iterator
/// early costs nothing. The sequence is restartable only by asking the
/// `Pen` for a new render.
///
/// # Errors
/// A picker result outside `[0, max(candidates, 1))` yields one
/// `Err(PenError::PickOutOfRange)` and ends the sequence; tokens already
/// yielded remain valid.
pub struct Render<'a, P> {
	pen: &'a Pen,
	picker: P,
	window: usize,
	// Ring buffer of capacity max(window, 1). While filling, entries live
	// in [0, filled) and the logical start is 0; once full, the logical
	// start is `cursor` and pushes overwrite the oldest entry.
	recent: Vec<Token>,
	filled: usize,
	cursor: usize,
	phase: Phase,
}

impl<P> std::fmt::Debug for Render<'_, P> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Render")
			.field("window", &self.window)
			.field("filled", &self.filled)
			.field("cursor", &self.cursor)
			.finish_non_exhaustive()
	}
}

impl<'a, P> Render<'a, P>
where
	P: FnMut(usize) -> usize,
{
	/// Builds a render in its initial phase. Arguments are validated by
	/// `Pen::render` before this is called.
	pub(crate) fn new(pen: &'a Pen, window: usize, picker: P, from: Option<usize>) -> Self {
		let capacity = window.max(1);
		let phase = if pen.context().is_empty() || pen.all_sentinels() {
			Phase::Done
		} else if let Some(position) = from {
			Phase::Seeding { position, remaining: capacity }
		} else {
			Phase::FirstToken
		};

		Self {
			pen,
			picker,
			window,
			recent: vec![None; capacity],
			filled: 0,
			cursor: 0,
			phase,
		}
	}

	fn push(&mut self, token: Token) {
		let capacity = self.recent.len();
		if self.filled < capacity {
			self.recent[self.filled] = token;
			self.filled += 1;
		} else {
			self.recent[self.cursor] = token;
			self.cursor = (self.cursor + 1) % capacity;
		}
	}

	fn finish(&mut self) {
		self.phase = Phase::Done;
	}
}

impl<P> Iterator for Render<'_, P>
where
	P: FnMut(usize) -> usize,
{
	type Item = Result<Token, PenError>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			match self.phase {
				Phase::Done => return None,
				Phase::Seeding { position, remaining } => {
					if remaining == 0 {
						self.phase = Phase::Streaming;
						continue;
					}
					// Reaching the corpus end or the sentinel while seeding
					// terminates the render.
					if position >= self.pen.context().len() {
						self.finish();
						return None;
					}
					let token = self.pen.context().at(position).clone();
					if self.pen.is_sentinel(&token) {
						self.finish();
						return None;
					}
					self.push(token.clone());
					self.phase = Phase::Seeding {
						position: position + 1,
						remaining: remaining - 1,
					};
					return Some(Ok(token));
				}
				Phase::FirstToken => {
					let length = self.pen.context().len();
					let candidates = length + 1;
					let picked = (self.picker)(candidates);
					if picked >= candidates {
						self.finish();
						return Some(Err(PenError::PickOutOfRange { picked, candidates }));
					}
					// `length` denotes the virtual successor slot.
					if picked == length {
						self.finish();
						return None;
					}
					let token = self.pen.context().at(picked).clone();
					if self.pen.is_sentinel(&token) {
						self.finish();
						return None;
					}
					self.push(token.clone());
					self.phase = Phase::Streaming;
					return Some(Ok(token));
				}
				Phase::Streaming => {
					let length = self.pen.context().len();

					// With no context window every corpus position plus the
					// virtual end slot is an equally likely continuation.
					let (first, candidates, depth) = if self.window == 0 {
						(0, length + 1, 0)
					} else {
						let sample = &self.recent[..self.filled];
						let start = if self.filled < self.recent.len() { 0 } else { self.cursor };
						let hit = self.pen.locate_cyclic(sample, start);
						(hit.first, hit.count, self.filled)
					};

					let picked = (self.picker)(candidates);
					if picked >= candidates.max(1) {
						self.finish();
						return Some(Err(PenError::PickOutOfRange { picked, candidates }));
					}
					if first + picked >= length {
						self.finish();
						return None;
					}

					// The picked slot's position, advanced past the matched
					// window to its successor token.
					let position = self.pen.position_at(first + picked) + depth;
					if position >= length {
						self.finish();
						return None;
					}
					let token = self.pen.context().at(position).clone();
					if self.pen.is_sentinel(&token) {
						self.finish();
						return None;
					}
					self.push(token.clone());
					return Some(Ok(token));
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::model::corpus::{Token, token};
	use crate::model::pen::Pen;

	fn corpus() -> Vec<Token> {
		["the", "cat", "sat", "the", "cat", "ran"]
			.iter()
			.map(|w| token(w))
			.collect()
	}

	fn scripted(picks: Vec<usize>) -> impl FnMut(usize) -> usize {
		let mut iter = picks.into_iter();
		move |_| iter.next().expect("picker called more often than scripted")
	}

	fn words(render: impl Iterator<Item = Result<Token, crate::model::PenError>>) -> Vec<String> {
		render
			.map(|t| t.unwrap().unwrap().to_string())
			.collect()
	}

	#[test]
	fn zero_window_draws_uniformly_without_history() {
		let pen = Pen::new(corpus());
		let render = pen.render(0, scripted(vec![0, 0, 0, 6]), None).unwrap();
		// First draw is direct (position 0), later draws map through the
		// index (slot 0 holds position 4, whose token is "cat"); a pick of
		// 6 is the virtual end slot.
		assert_eq!(words(render), vec!["the", "cat", "cat"]);
	}

	#[test]
	fn growing_window_uses_current_fill_as_depth() {
		let pen = Pen::new(corpus());
		// First pick lands on position 3 ("the"); with only one token
		// emitted the window depth is 1 even though the window size is 2.
		let render = pen.render(2, scripted(vec![3, 1, 0, 0]), None).unwrap();
		assert_eq!(words(render), vec!["the", "cat", "ran"]);
	}

	#[test]
	fn full_window_walks_the_corpus() {
		let pen = Pen::new(corpus());
		let render = pen.render(3, |_| 0, Some(0)).unwrap();
		// Three seeded tokens, then every 3-token window occurs exactly
		// once, so a constant-zero picker replays the corpus.
		assert_eq!(words(render), vec!["the", "cat", "sat", "the", "cat", "ran"]);
	}

	#[test]
	fn ring_buffer_state_tracks_emission_count() {
		let pen = Pen::new(corpus());
		let mut render = pen.render(3, |_| 0, Some(0)).unwrap();

		// emitted = 0
		assert_eq!((render.filled, render.cursor), (0, 0));
		render.next(); // emitted = 1
		assert_eq!((render.filled, render.cursor), (1, 0));
		render.next(); // emitted = 2 (k - 1)
		assert_eq!((render.filled, render.cursor), (2, 0));
		render.next(); // emitted = 3 (k): buffer full, still unrotated
		assert_eq!((render.filled, render.cursor), (3, 0));
		render.next(); // emitted = 4 (k + 1): oldest overwritten
		assert_eq!((render.filled, render.cursor), (3, 1));
	}

	#[test]
	fn seeding_stops_at_sentinel() {
		let tokens = vec![token("a"), token("end"), token("b")];
		let pen = Pen::with_options(
			tokens,
			token("end"),
			std::sync::Arc::new(crate::model::Ordinal),
			false,
		);
		let render = pen.render(3, |_| 0, Some(0)).unwrap();
		assert_eq!(words(render), vec!["a"]);
	}

	#[test]
	fn streaming_never_emits_the_sentinel() {
		let tokens = vec![token("a"), token("end"), token("b")];
		let pen = Pen::with_options(
			tokens,
			token("end"),
			std::sync::Arc::new(crate::model::Ordinal),
			false,
		);
		// Seed "a"; its only successor is the sentinel, so the render ends.
		let render = pen.render(1, |_| 0, Some(0)).unwrap();
		assert_eq!(words(render), vec!["a"]);
	}

	#[test]
	fn first_pick_out_of_range_fails_fast() {
		let pen = Pen::new(corpus());
		let mut render = pen.render(1, |n| n, None).unwrap();
		let error = render.next().unwrap().unwrap_err();
		assert_eq!(
			error,
			crate::model::PenError::PickOutOfRange { picked: 7, candidates: 7 }
		);
		assert!(render.next().is_none());
	}

	#[test]
	fn streaming_pick_out_of_range_keeps_delivered_tokens() {
		let pen = Pen::new(corpus());
		let mut render = pen.render(1, scripted(vec![2]), Some(0)).unwrap();
		assert_eq!(render.next().unwrap().unwrap(), token("the"));
		let error = render.next().unwrap().unwrap_err();
		assert_eq!(
			error,
			crate::model::PenError::PickOutOfRange { picked: 2, candidates: 2 }
		);
		assert!(render.next().is_none());
	}

	#[test]
	fn first_pick_of_virtual_end_emits_nothing() {
		let pen = Pen::new(corpus());
		let render = pen.render(1, |n| n - 1, None).unwrap();
		assert_eq!(words(render), Vec::<String>::new());
	}
}
