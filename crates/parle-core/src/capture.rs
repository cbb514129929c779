//! Capture vector and Var extraction.

use crate::grammar::VarRule;
use crate::text::Segment;

/// Strings available to substitution during one match.
///
/// Slot 0 is always the full segment text; later slots hold Var captures in
/// evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    slots: Vec<String>,
}

impl Captures {
    #[must_use]
    pub fn for_segment(segment: &Segment) -> Self {
        Self {
            slots: vec![segment.text()],
        }
    }

    /// Slot `index`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append a capture; empty strings are dropped.
    pub fn push(&mut self, value: String) {
        if !value.is_empty() {
            self.slots.push(value);
        }
    }
}

impl Default for Captures {
    fn default() -> Self {
        Self {
            slots: vec![String::new()],
        }
    }
}

/// Text following the last anchor occurrence, bounded by `rule.max` tokens.
#[must_use]
pub fn extract(segment: &Segment, rule: &VarRule) -> Option<String> {
    let anchor = rule
        .anchors
        .iter()
        .filter_map(|word| segment.last_index_of(word))
        .max()?;

    let rest = &segment.tokens()[anchor + 1..];
    let take = rule.max.map_or(rest.len(), |max| max.min(rest.len()));
    let text = rest[..take].join(" ");

    (!text.is_empty()).then_some(text)
}
