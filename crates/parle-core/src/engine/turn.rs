//! One user turn: segmentation, scoped then global matching, fallback.

use super::{Engine, runtime_values};
use crate::context::Transition;
use crate::eval::{self, Plan, Step};
use crate::grammar::{GrammarDocument, Item};
use crate::matcher;
use crate::text::{self, Segment};
use parle_types::{EngineUpdate, ReplyKind};
use std::rc::Rc;
use tracing::debug;

impl Engine {
    /// Process one utterance. Replies, actions and suggestion changes are
    /// sent via channel; a turn never fails.
    pub fn process(&mut self, input: &str) {
        let segments = text::segment(input);
        debug!("Processing {} segment(s) from {:?}", segments.len(), input);

        let last = segments.len().saturating_sub(1);
        for (index, segment) in segments.iter().enumerate() {
            let is_final = index == last;
            if !self.match_scoped(segment, is_final) {
                self.match_global(segment, is_final);
            }
        }
    }

    /// Try the sub-items expected by the pending follow-up.
    ///
    /// Returns false when nothing is pending or no sub-item produced output;
    /// the context is left for global matching to clear.
    fn match_scoped(&mut self, segment: &Segment, is_final: bool) -> bool {
        let Some(follow_up) = self.state.context.pending().cloned() else {
            return false;
        };

        let Some(document) = self
            .extensions
            .get(&follow_up.extension_id)
            .map(|entry| Rc::clone(&entry.document))
        else {
            debug!("Follow-up extension {} is gone", follow_up.extension_id);
            return false;
        };
        let Some(item) = document.item(&follow_up.item_id) else {
            return false;
        };

        for sub_item in item.sub_items(&follow_up.need_id) {
            let Some(plan) = self.try_item(segment, sub_item) else {
                continue;
            };

            debug!(
                "Follow-up {}/{} answered by {}",
                follow_up.extension_id, follow_up.item_id, follow_up.need_id
            );
            self.run_plan(&follow_up.extension_id, &plan, is_final);

            match self.state.context.advance(sub_item) {
                Transition::End => self.end_follow_up(),
                Transition::Advance => self.offer_propositions(sub_item),
                Transition::Stay => {}
            }
            return true;
        }

        false
    }

    /// Match every extension's items in registration order.
    fn match_global(&mut self, segment: &Segment, is_final: bool) {
        self.end_follow_up();

        let documents: Vec<(String, Rc<GrammarDocument>)> = self
            .extensions
            .iter()
            .map(|entry| (entry.id().to_string(), Rc::clone(&entry.document)))
            .collect();

        for (extension_id, document) in &documents {
            for item in &document.items {
                let Some(plan) = self.try_item(segment, item) else {
                    continue;
                };

                debug!(
                    "Segment {:?} matched item {:?} of {}",
                    segment.text(),
                    item.id,
                    extension_id
                );
                self.run_plan(extension_id, &plan, is_final);

                if self.state.context.begin(extension_id, item) {
                    debug!("Awaiting follow-up from {}", extension_id);
                    self.offer_propositions(item);
                }
                return;
            }
        }

        self.send_fallback(segment);
    }

    /// Plan of `item` for `segment`, or `None` when it does not match or
    /// produces nothing.
    fn try_item(&mut self, segment: &Segment, item: &Item) -> Option<Plan> {
        let blocks = matcher::match_item(segment, item)?;
        let values = runtime_values(&self.config, self.settings.settings(), self.clock.as_ref());
        let plan = eval::evaluate(segment, &blocks, &values, self.rng.as_mut());

        if plan.produced() {
            Some(plan)
        } else {
            debug!("Item {:?} matched but no branch applied", item.id);
            None
        }
    }

    /// Execute a plan in order; templates are expanded right before use.
    fn run_plan(&mut self, extension_id: &str, plan: &Plan, is_final: bool) {
        for step in &plan.steps {
            match step {
                Step::Reply(template) => {
                    let text = self.expand(template, &plan.captures);
                    self.send_update(EngineUpdate::message(text, is_final));
                }
                Step::Action(template) => {
                    self.dispatch_action(extension_id, template, &plan.captures);
                }
            }
        }
    }

    /// Offer an item's `Prop` list while its follow-up is pending.
    fn offer_propositions(&mut self, item: &Item) {
        if let Some(propositions) = item.propositions() {
            let updates = self.state.propositions.push_override(propositions);
            self.send_updates(updates);
        }
    }

    /// Leave any follow-up and undo its suggestion override.
    fn end_follow_up(&mut self) {
        if self.state.context.clear() {
            debug!("Follow-up ended");
        }
        let updates = self.state.propositions.restore();
        self.send_updates(updates);
    }

    fn send_fallback(&self, segment: &Segment) {
        debug!("No item matched {:?}", segment.text());
        let locale = &self.config.locale;
        self.send_update(EngineUpdate::Reply {
            text: locale.not_understood.clone(),
            is_final: true,
            kind: ReplyKind::Message,
            urls: vec![format!("web_message with_action_btn search {}", segment.text())],
            labels: vec![locale.search_web_label.clone()],
        });
    }
}
