use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use pen_core::model::{Ordinal, Pen, Token, token};

fn sample_of(words: &[&str]) -> Vec<Token> {
	words.iter().map(|w| token(w)).collect()
}

fn corpus() -> Vec<Token> {
	sample_of(&["the", "cat", "sat", "the", "cat", "ran"])
}

fn words(render: impl Iterator<Item = Result<Token, pen_core::model::PenError>>) -> Vec<String> {
	render.map(|t| t.unwrap().unwrap().to_string()).collect()
}

#[test]
fn occurrence_queries_match_a_naive_scan() {
	let tokens = corpus();
	let pen = Pen::new(tokens.clone());

	for sample in [
		sample_of(&["the"]),
		sample_of(&["cat"]),
		sample_of(&["the", "cat"]),
		sample_of(&["cat", "sat"]),
		sample_of(&["cat", "ran"]),
		sample_of(&["dog"]),
		sample_of(&["ran", "the"]),
	] {
		let expected: HashSet<usize> = (0..tokens.len())
			.filter(|&p| {
				p + sample.len() <= tokens.len() && tokens[p..p + sample.len()] == sample[..]
			})
			.collect();
		assert_eq!(pen.positions_of(&sample), expected, "sample {sample:?}");
		assert_eq!(pen.count(&sample), expected.len(), "sample {sample:?}");
	}
}

#[test]
fn seeded_window_forces_the_shared_successor() {
	// Both occurrences of "the" are followed by "cat", so whatever the
	// picker answers for the two candidates, the next token is "cat".
	let pen = Pen::new(corpus());
	for pick in [0, 1] {
		let mut render = pen.render(1, move |_| pick, Some(0)).unwrap();
		assert_eq!(render.next().unwrap().unwrap(), token("the"));
		assert_eq!(render.next().unwrap().unwrap(), token("cat"));
	}
}

#[test]
fn cat_successors_split_by_pick() {
	// After "cat" the two continuations are "ran" (suffix "cat ran" sorts
	// first under byte order) and "sat".
	let pen = Pen::new(corpus());

	let mut picks = vec![0usize, 0].into_iter();
	let render = pen.render(1, move |_| picks.next().unwrap(), Some(1)).unwrap();
	let out = words(render.take(2));
	assert_eq!(out, vec!["cat", "ran"]);

	let mut picks = vec![1usize, 0].into_iter();
	let render = pen.render(1, move |_| picks.next().unwrap(), Some(1)).unwrap();
	let out = words(render.take(2));
	assert_eq!(out, vec!["cat", "sat"]);
}

#[test]
fn constant_zero_picker_is_repeatable() {
	let pen = Pen::new(corpus());
	for window in [0, 1, 2, 3, 5] {
		let a = words(pen.render(window, |_| 0, Some(0)).unwrap().take(32));
		let b = words(pen.render(window, |_| 0, Some(0)).unwrap().take(32));
		assert_eq!(a, b, "window {window}");
	}
}

#[test]
fn start_at_corpus_length_is_an_empty_render() {
	let pen = Pen::new(corpus());
	for window in [0, 1, 4] {
		let render = pen.render(window, |_| 0, Some(6)).unwrap();
		assert_eq!(words(render), Vec::<String>::new(), "window {window}");
	}
}

#[test]
fn empty_corpus_renders_nothing() {
	let pen = Pen::new(Vec::new());
	for window in [0, 1, 3] {
		let render = pen.render(window, |_| 0, None).unwrap();
		assert_eq!(render.count(), 0, "window {window}");
	}
}

#[test]
fn all_sentinel_corpus_renders_nothing() {
	let tokens = vec![token(""), token(""), token("")];
	let pen = Pen::with_options(tokens, token(""), Arc::new(Ordinal), false);
	assert_eq!(pen.render(2, |_| 0, None).unwrap().count(), 0);
	assert_eq!(pen.render(2, |_| 0, Some(0)).unwrap().count(), 0);
}

#[test]
fn absent_tokens_are_ordinary_corpus_values() {
	// `None` is a legal token; with a present sentinel it is emitted like
	// any other value and sorts before every present token.
	let tokens = vec![token("a"), None, token("a"), None, token("b")];
	let pen = Pen::with_options(tokens, token("stop"), Arc::new(Ordinal), false);
	assert_eq!(pen.count(&[None]), 2);
	assert_eq!(pen.count(&[token("a"), None]), 2);

	let mut render = pen.render(1, |_| 0, Some(0)).unwrap();
	assert_eq!(render.next().unwrap().unwrap(), token("a"));
	assert_eq!(render.next().unwrap().unwrap(), None);
}

#[test]
fn seeded_rng_renders_are_reproducible() {
	let pen = Pen::new(corpus());

	let mut rng = StdRng::seed_from_u64(42);
	let a = words(pen.render_with_rng(2, &mut rng, None).unwrap().take(64));
	let mut rng = StdRng::seed_from_u64(42);
	let b = words(pen.render_with_rng(2, &mut rng, None).unwrap().take(64));
	assert_eq!(a, b);
}

#[test]
fn random_renders_only_emit_corpus_tokens() {
	let pen = Pen::new(corpus());
	let valid: HashSet<String> =
		["the", "cat", "sat", "ran"].iter().map(|s| s.to_string()).collect();
	for _ in 0..20 {
		for word in words(pen.render_random(2, None).unwrap().take(64)) {
			assert!(valid.contains(&word), "unexpected token {word}");
		}
	}
}

#[test]
fn concurrent_renders_share_one_pen() {
	let pen = Arc::new(Pen::new(corpus()));
	let mut handles = Vec::new();
	for seed in 0..4u64 {
		let pen = pen.clone();
		handles.push(std::thread::spawn(move || {
			let mut rng = StdRng::seed_from_u64(seed);
			words(pen.render_with_rng(2, &mut rng, None).unwrap().take(32))
		}));
	}
	for handle in handles {
		for word in handle.join().unwrap() {
			assert!(["the", "cat", "sat", "ran"].contains(&word.as_str()));
		}
	}
}

#[test]
fn snapshot_round_trip_replays_identical_output() {
	let pen = Pen::new(corpus());
	let restored = Pen::from_bytes(&pen.to_bytes().unwrap()).unwrap();

	for window in [0, 1, 3] {
		let mut rng = StdRng::seed_from_u64(7);
		let original = words(pen.render_with_rng(window, &mut rng, None).unwrap().take(64));
		let mut rng = StdRng::seed_from_u64(7);
		let replayed =
			words(restored.render_with_rng(window, &mut rng, None).unwrap().take(64));
		assert_eq!(original, replayed, "window {window}");
	}
}
