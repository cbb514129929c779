//! Input suggestions ("propositions") offered while the user types.
//!
//! `base` holds one representative per extension and is what the host shows on
//! an empty input. `pool` holds every suggestion and is filtered by prefix as
//! the user types. A follow-up may temporarily replace the base set and extend
//! the pool; `restore` undoes exactly that change.

use parle_types::EngineUpdate;
use rand::RngCore;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Override {
    saved_base: Vec<String>,
    offset: usize,
    count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropositionIndex {
    base: Vec<String>,
    pool: Vec<String>,
    shown: Vec<String>,
    active_override: Option<Override>,
}

fn has_prefix(candidate: &str, text: &str) -> bool {
    let head: String = candidate.chars().take(text.chars().count()).collect();
    head.to_lowercase() == text.to_lowercase()
}

impl PropositionIndex {
    #[must_use]
    pub fn base(&self) -> &[String] {
        &self.base
    }

    #[must_use]
    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    #[must_use]
    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    #[must_use]
    pub fn has_override(&self) -> bool {
        self.active_override.is_some()
    }

    /// Add an extension's suggestions; one of them, picked at random, joins
    /// the base set.
    pub fn add_seed(&mut self, seed: &[String], rng: &mut dyn RngCore) {
        if let Some(representative) = seed.choose(rng) {
            self.base.push(representative.clone());
        }
        self.pool.extend_from_slice(seed);
    }

    /// Forget everything, including a pending override.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace the shown list with the base set.
    pub fn show_base(&mut self) -> Vec<EngineUpdate> {
        let mut updates = Vec::with_capacity(self.base.len() + 1);
        updates.push(EngineUpdate::PropositionsCleared);

        self.shown.clone_from(&self.base);
        updates.extend(
            self.shown
                .iter()
                .map(|text| EngineUpdate::PropositionAdded { text: text.clone() }),
        );
        updates
    }

    /// Filter the shown list against the current input text.
    pub fn text_changed(&mut self, text: &str) -> Vec<EngineUpdate> {
        let mut updates = Vec::new();

        for index in (0..self.shown.len()).rev() {
            if !has_prefix(&self.shown[index], text) {
                self.shown.remove(index);
                updates.push(EngineUpdate::PropositionRemoved { index });
            }
        }

        for candidate in &self.pool {
            if has_prefix(candidate, text) && !self.shown.contains(candidate) {
                self.shown.push(candidate.clone());
                updates.push(EngineUpdate::PropositionAdded {
                    text: candidate.clone(),
                });
            }
        }

        updates
    }

    /// Offer `propositions` as the base set until `restore`.
    ///
    /// An override already in place is restored first, so one `restore`
    /// always returns to the state before the follow-up began.
    pub fn push_override(&mut self, propositions: &[String]) -> Vec<EngineUpdate> {
        self.undo_override();

        let saved_base = std::mem::replace(&mut self.base, propositions.to_vec());
        self.active_override = Some(Override {
            saved_base,
            offset: self.pool.len(),
            count: propositions.len(),
        });
        self.pool.extend_from_slice(propositions);

        self.show_base()
    }

    /// Undo a pushed override. No-op (and no updates) without one.
    pub fn restore(&mut self) -> Vec<EngineUpdate> {
        if self.undo_override() {
            self.show_base()
        } else {
            Vec::new()
        }
    }

    fn undo_override(&mut self) -> bool {
        let Some(pushed) = self.active_override.take() else {
            return false;
        };

        self.base = pushed.saved_base;
        let end = (pushed.offset + pushed.count).min(self.pool.len());
        self.pool.drain(pushed.offset.min(end)..end);
        true
    }
}
