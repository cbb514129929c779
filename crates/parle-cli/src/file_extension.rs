//! Grammar file loaded as an extension.

use anyhow::{Context, Result};
use parle_core::grammar;
use parle_core::{Extension, ExtensionContext};
use std::path::Path;
use tracing::debug;

/// Extension whose grammar is a file on disk. Forwarded actions are printed.
pub struct FileExtension {
    id: String,
    xml: String,
    suggestions: Vec<String>,
}

impl FileExtension {
    /// Read `path`; the extension id is the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grammar {}", path.display()))?;
        let id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("Grammar path has no usable name: {}", path.display()))?
            .to_string();

        // Malformed grammars are reported by the engine at registration
        let suggestions = grammar::parse(&xml)
            .map(|document| document.suggestions)
            .unwrap_or_default();

        debug!("Loaded grammar {} from {}", id, path.display());
        Ok(Self {
            id,
            xml,
            suggestions,
        })
    }
}

impl Extension for FileExtension {
    fn identifier(&self) -> &str {
        &self.id
    }

    fn grammar_document(&self) -> String {
        self.xml.clone()
    }

    fn execute_action(&self, tokens: &[String], _ctx: &ExtensionContext) {
        println!("  ⚙ {}: {}", self.id, tokens.join(" "));
    }

    fn suggestion_seed(&self) -> Vec<String> {
        self.suggestions.clone()
    }

    fn message_received(&self, message: &str, ctx: &ExtensionContext) {
        ctx.message_to_view(message);
    }
}
