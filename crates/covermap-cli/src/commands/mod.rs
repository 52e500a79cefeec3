//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database setup (init, audit) and shared utilities (open_db)
//! - `questionnaires` - Questionnaire commands (new, answer, show, list)
//! - `assess` - Assessment commands (assess, evaluate) and report printing
//! - `serve` - Web server command

pub mod assess;
pub mod core;
pub mod questionnaires;
pub mod serve;

// Re-export command functions for main.rs
pub use assess::*;
pub use core::*;
pub use questionnaires::*;
pub use serve::*;
