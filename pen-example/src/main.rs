use std::sync::Arc;

use pen_core::model::{Ordinal, Pen, token};
use pen_core::reader::{ReaderConfig, tokens_from_str};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Tokenize a small corpus with the default reader policy
    // (whitespace splitting, line ends discarded, no empty tokens)
    let text = "the cat sat on the mat\n\
                the cat ran down the hall\n\
                a dog sat on the mat";
    let tokens = tokens_from_str(text, &ReaderConfig::default());

    // Build a pen with a sentinel token and string interning enabled;
    // repeated words like "the" share one allocation
    let pen = Pen::with_options(tokens, token("<end>"), Arc::new(Ordinal), true);

    // Occurrence queries run against the sorted position index
    println!("corpus size: {}", pen.len());
    println!("count of 'the': {}", pen.count(&[token("the")]));
    println!("count of 'sat on': {}", pen.count(&[token("sat"), token("on")]));
    let mut positions: Vec<usize> = pen.positions_of(&[token("cat")]).into_iter().collect();
    positions.sort_unstable();
    println!("'cat' starts at: {:?}", positions);

    // A render is a lazy iterator; bound it externally with `take`.
    // A seeded RNG makes the output reproducible run to run
    let mut rng = StdRng::seed_from_u64(7);
    let rendered: Vec<String> = pen
        .render_with_rng(2, &mut rng, None)?
        .take(30)
        .map(|t| Ok::<_, pen_core::model::PenError>(t?.map(|s| s.to_string()).unwrap_or_default()))
        .collect::<Result<_, _>>()?;
    println!("seeded render: {}", rendered.join(" "));

    // Starting from a corpus position copies the first window verbatim
    let opening: Vec<String> = pen
        .render(2, |_| 0, Some(0))?
        .take(8)
        .map(|t| Ok::<_, pen_core::model::PenError>(t?.map(|s| s.to_string()).unwrap_or_default()))
        .collect::<Result<_, _>>()?;
    println!("deterministic render from 0: {}", opening.join(" "));

    // Snapshots round-trip the whole pen without re-sorting the index
    let bytes = pen.to_bytes()?;
    let restored = Pen::from_bytes(&bytes)?;
    println!(
        "restored pen agrees on 'the': {}",
        restored.count(&[token("the")]) == pen.count(&[token("the")])
    );

    // The convenience picker needs no setup when determinism is not needed
    let babble: Vec<String> = pen
        .render_random(2, None)?
        .take(15)
        .filter_map(|t| t.ok().flatten().map(|s| s.to_string()))
        .collect();
    println!("random render: {}", babble.join(" "));

    Ok(())
}
