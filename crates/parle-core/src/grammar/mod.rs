//! Extension grammars: the rule model and its XML reader.

mod model;
mod parse;

pub use model::{
    Block, Entry, GrammarDocument, Item, Keywords, NEED_ID_END, VarRule, WordSet,
};
pub use parse::parse;
