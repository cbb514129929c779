//! Single-slot dialogue context carried between turns.

use crate::grammar::Item;

/// Pending follow-up: the next segment is first matched against the
/// sub-items `need_id` of item `item_id` in extension `extension_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    pub extension_id: String,
    pub item_id: String,
    pub need_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogueContext {
    #[default]
    Idle,
    AwaitingFollowUp(FollowUp),
}

/// Effect of a producing sub-item on a pending follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Sub-item has no `needId`; same expectation next turn
    Stay,
    /// Sub-item names the next expected sub-item
    Advance,
    /// Sub-item carries the `null` sentinel
    End,
}

impl DialogueContext {
    #[must_use]
    pub fn pending(&self) -> Option<&FollowUp> {
        match self {
            Self::Idle => None,
            Self::AwaitingFollowUp(follow_up) => Some(follow_up),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Enter a follow-up opened by `item` of `extension_id`.
    ///
    /// Returns false (and stays unchanged) when the item lacks `id` or `needId`.
    pub fn begin(&mut self, extension_id: &str, item: &Item) -> bool {
        let Some((item_id, need_id)) = item.follow_up() else {
            return false;
        };

        *self = Self::AwaitingFollowUp(FollowUp {
            extension_id: extension_id.to_string(),
            item_id: item_id.to_string(),
            need_id: need_id.to_string(),
        });
        true
    }

    /// Apply the `needId` of the sub-item that answered the follow-up.
    pub fn advance(&mut self, sub_item: &Item) -> Transition {
        let Self::AwaitingFollowUp(follow_up) = self else {
            return Transition::Stay;
        };

        if sub_item.ends_follow_up() {
            *self = Self::Idle;
            return Transition::End;
        }

        match &sub_item.need_id {
            Some(next) => {
                follow_up.need_id.clone_from(next);
                Transition::Advance
            }
            None => Transition::Stay,
        }
    }

    /// Return to idle. Returns whether a follow-up was pending.
    pub fn clear(&mut self) -> bool {
        !std::mem::take(self).is_idle()
    }
}
