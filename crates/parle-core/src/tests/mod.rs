//! Scenario tests for parle-core
//!
//! These drive a whole `Engine` through its public operations:
//! - Turn processing (segmentation, matching order, fallback)
//! - Multi-turn follow-ups and proposition overrides
//! - Built-in and forwarded actions
//! - Registration, host events and configuration files

mod dispatch_tests;
mod turn_tests;
