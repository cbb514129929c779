//! Evaluation of a matched item's Var, Reply and Actions blocks.
//!
//! Evaluation picks templates but does not expand or dispatch them: the
//! resulting [`Plan`] is executed by the engine in order, so a `settings`
//! action is visible to the replies that follow it.

use crate::capture::{self, Captures};
use crate::grammar::{Block, Entry};
use crate::substitute::{RuntimeValues, substitute};
use crate::text::Segment;
use rand::{Rng, RngCore};

/// One selected template, still unexpanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Reply(String),
    Action(String),
}

/// Output of one matched item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub captures: Captures,
    pub steps: Vec<Step>,
}

impl Plan {
    /// False when no branch applied; the item then counts as a non-match.
    #[must_use]
    pub fn produced(&self) -> bool {
        !self.steps.is_empty()
    }

    #[must_use]
    pub fn has_reply(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, Step::Reply(_)))
    }
}

/// Run the blocks returned by the matcher against `segment`.
pub fn evaluate(
    segment: &Segment,
    blocks: &[&Block],
    values: &RuntimeValues<'_>,
    rng: &mut dyn RngCore,
) -> Plan {
    let mut captures = Captures::for_segment(segment);
    let mut steps = Vec::new();

    for block in blocks {
        match block {
            Block::Var(rule) => {
                if let Some(text) = capture::extract(segment, rule) {
                    captures.push(text);
                }
            }
            Block::Reply(entries) => {
                let mut chosen = Vec::new();
                select(entries, &captures, values, rng, &mut chosen);
                steps.extend(chosen.into_iter().map(Step::Reply));
            }
            Block::Actions(entries) => {
                let mut chosen = Vec::new();
                select(entries, &captures, values, rng, &mut chosen);
                steps.extend(chosen.into_iter().map(Step::Action));
            }
            Block::Keywords(_) | Block::Prop(_) | Block::Item(_) => {}
        }
    }

    Plan { captures, steps }
}

/// Walk an entry sequence, appending one template per fired pool.
fn select(
    entries: &[Entry],
    captures: &Captures,
    values: &RuntimeValues<'_>,
    rng: &mut dyn RngCore,
    out: &mut Vec<String>,
) {
    let mut last_condition = false;
    let mut i = 0;

    while i < entries.len() {
        match &entries[i] {
            Entry::Leaf(_) => {
                let start = i;
                while i < entries.len() && matches!(entries[i], Entry::Leaf(_)) {
                    i += 1;
                }
                let pool = &entries[start..i];
                if let Entry::Leaf(text) = &pool[rng.gen_range(0..pool.len())] {
                    out.push(text.clone());
                }
                continue;
            }
            Entry::Condition { test, body } => {
                last_condition = condition_holds(test, captures, values);
                if last_condition {
                    select(body, captures, values, rng, out);
                }
            }
            Entry::Else(body) => {
                if !last_condition {
                    select(body, captures, values, rng, out);
                }
            }
        }
        i += 1;
    }
}

/// Evaluate an `if` attribute such as `?1=oui` or `?name!Inconnue`.
///
/// The test splits on its first `!` or `=`; a `=` right after it belongs to
/// the operator (`!=`, `==`). Both operands are expanded before comparing.
/// A test without operator is false.
#[must_use]
pub fn condition_holds(test: &str, captures: &Captures, values: &RuntimeValues<'_>) -> bool {
    let Some(pos) = test.find(['!', '=']) else {
        return false;
    };

    let negate = test[pos..].starts_with('!');
    let right = &test[pos + 1..];
    let right = right.strip_prefix('=').unwrap_or(right);

    let left = substitute(&test[..pos], captures, values);
    let right = substitute(right, captures, values);

    if negate { left != right } else { left == right }
}
