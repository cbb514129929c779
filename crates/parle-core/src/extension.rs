//! Extension interface and the ordered registry of loaded extensions.
//!
//! An extension contributes a grammar document, a suggestion seed and an
//! action handler. Its grammar is parsed once, at registration.

use crate::grammar::{self, GrammarDocument};
use crate::{Error, Result};
use parle_types::{EngineUpdate, ReplyKind};
use std::rc::Rc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

/// A capability module registered with the engine.
pub trait Extension {
    /// Unique id, also used to route forwarded actions and messages
    fn identifier(&self) -> &str;

    /// XML rule document, read once at registration
    fn grammar_document(&self) -> String;

    /// Handle an action the engine does not recognize itself
    fn execute_action(&self, tokens: &[String], ctx: &ExtensionContext);

    /// Suggestions this extension offers while the user types
    fn suggestion_seed(&self) -> Vec<String>;

    /// Message sent by the view layer to this extension
    fn message_received(&self, message: &str, ctx: &ExtensionContext) {
        let _ = (message, ctx);
    }
}

/// Outbound channel handed to an extension while the engine calls it.
#[derive(Debug, Clone)]
pub struct ExtensionContext {
    extension_id: String,
    update_tx: UnboundedSender<EngineUpdate>,
}

impl ExtensionContext {
    pub(crate) fn new(extension_id: &str, update_tx: UnboundedSender<EngineUpdate>) -> Self {
        Self {
            extension_id: extension_id.to_string(),
            update_tx,
        }
    }

    #[must_use]
    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    /// Send a plain chat reply.
    pub fn reply(&self, text: &str, is_final: bool) {
        self.send(EngineUpdate::message(text, is_final));
    }

    /// Send a reply with explicit kind and parallel `urls`/`labels` lists.
    pub fn reply_with(&self, text: &str, kind: ReplyKind, urls: Vec<String>, labels: Vec<String>) {
        self.send(EngineUpdate::Reply {
            text: text.to_string(),
            is_final: true,
            kind,
            urls,
            labels,
        });
    }

    /// Ask the host to display a generated view.
    pub fn show_view(&self, url: &str) {
        self.send(EngineUpdate::ShowGeneratedView {
            url: url.to_string(),
        });
    }

    /// Send a message to this extension's view.
    pub fn message_to_view(&self, message: &str) {
        self.send(EngineUpdate::ExtensionMessage {
            extension_id: self.extension_id.clone(),
            message: message.to_string(),
        });
    }

    fn send(&self, update: EngineUpdate) {
        if let Err(e) = self.update_tx.send(update) {
            error!("Failed to send update from {}: {}", self.extension_id, e);
        }
    }
}

/// An extension together with its parsed grammar.
pub struct Registered {
    pub extension: Box<dyn Extension>,
    /// Shared so a turn can hold it while the engine mutates its state
    pub document: Rc<GrammarDocument>,
}

impl Registered {
    #[must_use]
    pub fn id(&self) -> &str {
        self.extension.identifier()
    }
}

/// Extensions in registration order.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: Vec<Registered>,
}

impl ExtensionRegistry {
    /// Parse the extension's grammar and append it.
    ///
    /// A malformed grammar is logged and leaves the extension with no items.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateExtension` if the id is already registered.
    pub fn register(&mut self, extension: Box<dyn Extension>) -> Result<&Registered> {
        let id = extension.identifier().to_string();
        if self.get(&id).is_some() {
            return Err(Error::DuplicateExtension(id));
        }

        let document = match grammar::parse(&extension.grammar_document()) {
            Ok(document) => document,
            Err(e) => {
                warn!("Extension {} has a malformed grammar: {}", id, e);
                GrammarDocument::default()
            }
        };

        info!("Registered extension {} ({} items)", id, document.items.len());
        debug!("{} suggestions declared by {}", document.suggestions.len(), id);

        self.entries.push(Registered {
            extension,
            document: Rc::new(document),
        });
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    /// Remove and return the extension with `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExtensionNotFound` if no extension has that id.
    pub fn unregister(&mut self, id: &str) -> Result<Registered> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or_else(|| Error::ExtensionNotFound(id.to_string()))?;

        info!("Unregistered extension {}", id);
        Ok(self.entries.remove(position))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Registered> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registered> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Registered::id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
