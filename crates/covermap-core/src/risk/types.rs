//! Core types for the risk evaluator

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Insurance categories scored independently
///
/// Declaration order is the canonical order used for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Life,
    Auto,
    Home,
    Travel,
}

impl Category {
    /// Every category, in canonical order
    pub const ALL: [Category; 4] = [
        Category::Life,
        Category::Auto,
        Category::Home,
        Category::Travel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Life => "life",
            Category::Auto => "auto",
            Category::Home => "home",
            Category::Travel => "travel",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "life" => Ok(Category::Life),
            "auto" => Ok(Category::Auto),
            "home" => Ok(Category::Home),
            "travel" => Ok(Category::Travel),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// A single piece of advice attached to a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Short headline (e.g., "Increase liability limit")
    pub title: String,
    /// Full explanation shown to the user
    pub detail: String,
    /// Urgency hint, lower = more urgent. Descriptive only; never used for ordering.
    pub priority: u8,
}

impl Recommendation {
    pub fn new(title: impl Into<String>, detail: impl Into<String>, priority: u8) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            priority,
        }
    }
}

/// Score and advice for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    /// 0-100
    pub score: u32,
    /// In the order the rules fired
    pub recommendations: Vec<Recommendation>,
}

/// Output of the risk evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Mean of the active (non-zero) category scores
    pub overall_risk_score: u32,
    /// Always holds all four categories
    pub categories: BTreeMap<Category, CategoryResult>,
}

impl AssessmentResult {
    /// Result for a category (empty result if somehow missing)
    pub fn category(&self, category: Category) -> CategoryResult {
        self.categories.get(&category).cloned().unwrap_or_default()
    }

    /// Total number of recommendations across categories
    pub fn recommendation_count(&self) -> usize {
        self.categories
            .values()
            .map(|c| c.recommendations.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()).unwrap(), category);
        }
        assert!(Category::from_str("pet").is_err());
    }

    #[test]
    fn test_category_ordering_is_canonical() {
        let mut shuffled = vec![Category::Travel, Category::Life, Category::Home, Category::Auto];
        shuffled.sort();
        assert_eq!(shuffled, Category::ALL.to_vec());
    }

    #[test]
    fn test_assessment_serializes_contract_field_names() {
        let mut categories = BTreeMap::new();
        categories.insert(
            Category::Travel,
            CategoryResult {
                score: 30,
                recommendations: vec![Recommendation::new("Title", "Detail", 0)],
            },
        );
        categories.insert(Category::Life, CategoryResult::default());

        let result = AssessmentResult {
            overall_risk_score: 30,
            categories,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overall_risk_score"], 30);
        assert_eq!(json["categories"]["travel"]["score"], 30);
        assert_eq!(
            json["categories"]["travel"]["recommendations"][0]["title"],
            "Title"
        );
        assert_eq!(
            json["categories"]["travel"]["recommendations"][0]["detail"],
            "Detail"
        );
        assert_eq!(
            json["categories"]["travel"]["recommendations"][0]["priority"],
            0
        );
        assert_eq!(json["categories"]["life"]["recommendations"], serde_json::json!([]));
    }
}
