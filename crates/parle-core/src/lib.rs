pub mod capture;
pub mod config;
pub mod context;
pub mod eval;
pub mod extension;
pub mod grammar;
pub mod matcher;
pub mod propositions;
pub mod substitute;
pub mod text;

mod engine;
mod error;

#[cfg(test)]
mod tests;

pub use engine::Engine;
pub use error::{Error, Result};
pub use extension::{Extension, ExtensionContext};

pub use parle_types::*;
