//! Keyword constraint matching of one segment against one item.

use crate::grammar::{Block, Item, Keywords, WordSet};
use crate::text::Segment;

/// Whether a Keywords block accepts the segment.
#[must_use]
pub fn keywords_pass(segment: &Segment, keywords: &Keywords) -> bool {
    let count = segment.len();
    if count < keywords.min_word || keywords.max_word.is_some_and(|max| count > max) {
        return false;
    }

    keywords.sets.iter().all(|set| match set {
        WordSet::Words(words) => words.iter().any(|w| segment.contains(w)),
        WordSet::NoWords(words) => !words.iter().any(|w| segment.contains(w)),
    })
}

/// Match an item against a segment.
///
/// Returns the blocks to execute, in document order, when every Keywords
/// block passes. Blocks before the first Keywords block are never executed,
/// and nested follow-up items are never part of the result. An item without
/// any Keywords block does not match.
#[must_use]
pub fn match_item<'a>(segment: &Segment, item: &'a Item) -> Option<Vec<&'a Block>> {
    let mut gated = false;
    let mut blocks = Vec::new();

    for block in &item.blocks {
        match block {
            Block::Keywords(keywords) => {
                if !keywords_pass(segment, keywords) {
                    return None;
                }
                gated = true;
            }
            Block::Item(_) => {}
            other if gated => blocks.push(other),
            _ => {}
        }
    }

    gated.then_some(blocks)
}
