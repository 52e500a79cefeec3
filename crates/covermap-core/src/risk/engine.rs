//! Risk evaluator - runs the category rule lists and derives the overall score

use std::collections::BTreeMap;

use tracing::debug;

use crate::context::{build_context, Context};

use super::rules::rules_for;
use super::types::{AssessmentResult, Category, CategoryResult};

/// Upper bound for any category score
pub const MAX_CATEGORY_SCORE: u32 = 100;

/// Evaluate a context into per-category scores and recommendations
///
/// Pure and total: every category is always present in the result.
pub fn evaluate(ctx: &Context) -> AssessmentResult {
    let categories: BTreeMap<Category, CategoryResult> = Category::ALL
        .iter()
        .map(|category| (*category, evaluate_category(*category, ctx)))
        .collect();

    let overall_risk_score = overall_score(categories.values().map(|c| c.score));

    AssessmentResult {
        overall_risk_score,
        categories,
    }
}

/// Build the context from stored answers and evaluate it
pub fn assess(stored: &BTreeMap<String, String>) -> AssessmentResult {
    evaluate(&build_context(stored))
}

/// Run one category's rules in declared order
///
/// The score is clamped once, after all rules have fired.
pub fn evaluate_category(category: Category, ctx: &Context) -> CategoryResult {
    let mut score: u32 = 0;
    let mut recommendations = vec![];
    let mut fired = vec![];

    for rule in rules_for(category) {
        if let Some(outcome) = rule.fire(ctx) {
            score = score.saturating_add(outcome.delta);
            recommendations.extend(outcome.recommendation);
            fired.push(rule.id);
        }
    }

    let score = score.min(MAX_CATEGORY_SCORE);

    debug!(
        category = category.as_str(),
        score,
        rules = ?fired,
        "Category evaluated"
    );

    CategoryResult {
        score,
        recommendations,
    }
}

/// Truncating mean of the strictly positive scores, 0 when none are positive
///
/// Inactive categories are left out of the denominator entirely.
pub fn overall_score(scores: impl IntoIterator<Item = u32>) -> u32 {
    let (sum, count) = scores
        .into_iter()
        .filter(|s| *s > 0)
        .fold((0u64, 0u64), |(sum, count), s| (sum + u64::from(s), count + 1));

    if count == 0 {
        0
    } else {
        (sum / count) as u32
    }
}
