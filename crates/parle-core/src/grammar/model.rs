/// `needId` value that ends a follow-up.
pub const NEED_ID_END: &str = "null";

/// Parsed grammar of one extension. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarDocument {
    pub items: Vec<Item>,

    /// Root-level `<Suggest>` entries, offered as the extension's suggestion seed
    pub suggestions: Vec<String>,
}

impl GrammarDocument {
    /// Top-level item with the given `id`.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id.as_deref() == Some(id))
    }
}

/// A rule unit: constraint blocks evaluated in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub id: Option<String>,
    pub need_id: Option<String>,
    pub blocks: Vec<Block>,
}

impl Item {
    /// `(id, needId)` when this item opens a follow-up.
    #[must_use]
    pub fn follow_up(&self) -> Option<(&str, &str)> {
        match (self.id.as_deref(), self.need_id.as_deref()) {
            (Some(id), Some(need_id)) => Some((id, need_id)),
            _ => None,
        }
    }

    /// Whether this item's `needId` is the end sentinel.
    #[must_use]
    pub fn ends_follow_up(&self) -> bool {
        self.need_id.as_deref() == Some(NEED_ID_END)
    }

    /// Nested follow-up items whose `id` equals `id`, in document order.
    pub fn sub_items<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.blocks.iter().filter_map(move |block| match block {
            Block::Item(item) if item.id.as_deref() == Some(id) => Some(item),
            _ => None,
        })
    }

    /// Propositions offered while this item's follow-up is pending.
    #[must_use]
    pub fn propositions(&self) -> Option<&[String]> {
        self.blocks.iter().find_map(|block| match block {
            Block::Prop(props) => Some(props.as_slice()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Keywords(Keywords),
    Var(VarRule),
    Reply(Vec<Entry>),
    Actions(Vec<Entry>),
    Prop(Vec<String>),
    Item(Item),
}

/// Word-count range plus required/forbidden word sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    pub min_word: usize,
    /// `None` = no upper bound
    pub max_word: Option<usize>,
    pub sets: Vec<WordSet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordSet {
    /// At least one member must be present
    Words(Vec<String>),
    /// No member may be present
    NoWords(Vec<String>),
}

/// Capture of the tokens following an anchor word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarRule {
    pub anchors: Vec<String>,
    /// `None` = capture every remaining token
    pub max: Option<usize>,
}

/// Entry of a Reply or Actions block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Literal template (`rep` / `action`)
    Leaf(String),
    Condition { test: String, body: Vec<Entry> },
    Else(Vec<Entry>),
}
