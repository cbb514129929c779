//! XML grammar parsing.
//!
//! The document is read once into a small element tree, then converted to the
//! immutable model. Unknown tags are skipped.

use super::model::{Block, Entry, GrammarDocument, Item, Keywords, VarRule, WordSet};
use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::Grammar(format!("<{name}>: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Grammar(format!("<{name} {key}>: {e}")))?
                .into_owned();
            attrs.push((key, value));
        }

        Ok(Self {
            name,
            attrs,
            ..Default::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, with empty strings treated as absent.
    fn non_empty_attr(&self, key: &str) -> Option<String> {
        self.attr(key)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    }

    fn usize_attr(&self, key: &str) -> Result<Option<usize>> {
        match self.attr(key).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                Error::Grammar(format!("<{}> {key}=\"{raw}\" is not a count", self.name))
            }),
        }
    }

    fn child_texts(&self) -> Vec<String> {
        self.children.iter().map(|c| c.text.clone()).collect()
    }
}

fn read_tree(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Grammar(format!("at byte {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(start) => stack.push(Node::from_start(&start)?),
            Event::Empty(start) => attach(&mut stack, &mut root, Node::from_start(&start)?)?,
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::Grammar("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| Error::Grammar(e.to_string()))?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Grammar(format!("unclosed <{}>", open.name)));
    }

    root.ok_or_else(|| Error::Grammar("empty document".to_string()))
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::Grammar(format!(
            "second root element <{}>",
            node.name
        )));
    }
    *root = Some(node);
    Ok(())
}

/// Parse a grammar document.
///
/// # Errors
///
/// Returns `Error::Grammar` if the XML is malformed or a count attribute is
/// not a number.
pub fn parse(xml: &str) -> Result<GrammarDocument> {
    let root = read_tree(xml)?;
    let mut document = GrammarDocument::default();

    for child in &root.children {
        match child.name.as_str() {
            "Item" => document.items.push(convert_item(child)?),
            "Suggest" => document.suggestions.extend(child.child_texts()),
            other => debug!("Ignoring <{other}> at grammar root"),
        }
    }

    Ok(document)
}

fn convert_item(node: &Node) -> Result<Item> {
    let mut blocks = Vec::with_capacity(node.children.len());

    for child in &node.children {
        let block = match child.name.as_str() {
            "Keywords" => Block::Keywords(convert_keywords(child)?),
            "Var" => Block::Var(VarRule {
                anchors: child.child_texts(),
                max: child.usize_attr("max")?.filter(|max| *max > 0),
            }),
            "Reply" => Block::Reply(convert_entries(&child.children)),
            "Actions" => Block::Actions(convert_entries(&child.children)),
            "Prop" => Block::Prop(child.child_texts()),
            "Item" => Block::Item(convert_item(child)?),
            other => {
                debug!("Ignoring <{other}> in <Item>");
                continue;
            }
        };
        blocks.push(block);
    }

    Ok(Item {
        id: node.non_empty_attr("id"),
        need_id: node.non_empty_attr("needId"),
        blocks,
    })
}

fn convert_keywords(node: &Node) -> Result<Keywords> {
    let mut sets = Vec::new();

    for child in &node.children {
        match child.name.as_str() {
            "Words" => sets.push(WordSet::Words(child.child_texts())),
            "NoWords" => sets.push(WordSet::NoWords(child.child_texts())),
            other => debug!("Ignoring <{other}> in <Keywords>"),
        }
    }

    Ok(Keywords {
        min_word: node.usize_attr("minWord")?.unwrap_or(0),
        max_word: node.usize_attr("maxWord")?,
        sets,
    })
}

fn convert_entries(nodes: &[Node]) -> Vec<Entry> {
    nodes
        .iter()
        .map(|node| match node.name.as_str() {
            "condition" => Entry::Condition {
                test: node.attr("if").unwrap_or_default().to_string(),
                body: convert_entries(&node.children),
            },
            "else" => Entry::Else(convert_entries(&node.children)),
            _ => Entry::Leaf(node.text.clone()),
        })
        .collect()
}
