//! Risk Evaluator - rule-based insurance risk assessment
//!
//! Maps a normalized [`Context`](crate::context::Context) into per-category
//! scores (life, auto, home, travel) with ranked, human-readable
//! recommendations, plus an overall score.
//!
//! ## Scoring
//!
//! - Each category runs a fixed, ordered list of rules (see [`rules`])
//! - A fired rule adds its delta and may append a recommendation
//! - Category scores are clamped to 100 after all rules run
//! - The overall score is the truncating mean of the non-zero category scores
//!
//! ## Usage
//!
//! ```rust,ignore
//! use covermap_core::{context::build_context, risk::evaluate};
//!
//! let ctx = build_context(&db.get_answers(questionnaire_id)?);
//! let assessment = evaluate(&ctx);
//! println!("overall: {}", assessment.overall_risk_score);
//! ```

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{assess, evaluate, evaluate_category, overall_score, MAX_CATEGORY_SCORE};
pub use rules::{format_dollars, rules_for, Rule, RuleOutcome};
pub use types::{AssessmentResult, Category, CategoryResult, Recommendation};
