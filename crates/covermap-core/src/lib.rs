//! Covermap Core Library
//!
//! Shared functionality for the covermap insurance coverage assessment tool:
//! - Context builder turning stored questionnaire answers into a typed context
//! - Rule-based risk evaluator for life, auto, home and travel coverage
//! - Database access and migrations (questionnaires, answers, audit log)
//! - Pluggable advice generators (OpenAI-compatible, Ollama) with static fallback
//! - Report assembly when a questionnaire is completed

pub mod ai;
pub mod context;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod risk;

/// Test utilities including a mock language-model server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{generate_advice, AIClient, Advice, AdviceBackend, MockBackend};
pub use context::{build_context, Context};
pub use db::Database;
pub use error::{Error, Result};
pub use models::{AuditEntry, AuditSubject, Questionnaire, QuestionnaireStatus, QuestionnaireWithAnswers, Report};
pub use report::complete_questionnaire;
pub use risk::{assess, evaluate, AssessmentResult, Category, CategoryResult, Recommendation};
