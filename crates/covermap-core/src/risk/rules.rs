//! Ordered scoring rules per category
//!
//! Each category owns a fixed list of rules evaluated in declared order. A rule
//! that fires adds its score delta and may append one recommendation, so the
//! list order is the recommendation order.

use crate::context::Context;

use super::types::{Category, Recommendation};

/// Coverage suggested per dollar of income ("10x income" heuristic)
pub const TERM_LIFE_INCOME_MULTIPLE: f64 = 10.0;

/// Liability limit many Ontario drivers carry
pub const RECOMMENDED_LIABILITY_LIMIT: f64 = 2_000_000.0;

/// Province with a mandatory-coverage recommendation
pub const ONTARIO: &str = "ON";

/// A single (predicate, score delta, optional recommendation) step
pub struct Rule {
    /// Stable identifier used in logs and tests
    pub id: &'static str,
    pub category: Category,
    /// Points added when the rule fires
    pub delta: u32,
    pub applies: fn(&Context) -> bool,
    pub recommend: Option<fn(&Context) -> Recommendation>,
}

/// What a fired rule contributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub delta: u32,
    pub recommendation: Option<Recommendation>,
}

impl Rule {
    /// Evaluate this rule alone against a context
    pub fn fire(&self, ctx: &Context) -> Option<RuleOutcome> {
        if !(self.applies)(ctx) {
            return None;
        }
        Some(RuleOutcome {
            delta: self.delta,
            recommendation: self.recommend.map(|build| build(ctx)),
        })
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("delta", &self.delta)
            .finish()
    }
}

/// Rules for a category, in evaluation order
pub fn rules_for(category: Category) -> &'static [Rule] {
    match category {
        Category::Life => &LIFE_RULES[..],
        Category::Auto => &AUTO_RULES[..],
        Category::Home => &HOME_RULES[..],
        Category::Travel => &TRAVEL_RULES[..],
    }
}

/// Format a dollar amount as whole dollars with thousands separators ("$900,000")
///
/// Halves round to even, so $12,344.50 shows as "$12,344".
pub fn format_dollars(amount: f64) -> String {
    let rounded = amount.round_ties_even();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

// ----------------------------------------------------------------------------
// Life
// ----------------------------------------------------------------------------

static LIFE_RULES: [Rule; 3] = [
    Rule {
        id: "life.term_coverage",
        category: Category::Life,
        delta: 30,
        applies: has_dependants_and_income,
        recommend: Some(term_life_recommendation),
    },
    Rule {
        id: "life.mortgage",
        category: Category::Life,
        delta: 20,
        applies: has_mortgage,
        recommend: Some(mortgage_recommendation),
    },
    Rule {
        id: "life.no_existing_policy",
        category: Category::Life,
        delta: 10,
        applies: lacks_life_with_obligations,
        recommend: Some(no_existing_life_recommendation),
    },
];

fn has_dependants_and_income(ctx: &Context) -> bool {
    ctx.dependants > 0 && ctx.income > 0.0
}

fn has_mortgage(ctx: &Context) -> bool {
    ctx.has_mortgage
}

fn lacks_life_with_obligations(ctx: &Context) -> bool {
    !ctx.has_existing_life && (ctx.dependants > 0 || ctx.has_mortgage)
}

fn term_life_recommendation(ctx: &Context) -> Recommendation {
    let coverage = ctx.income * TERM_LIFE_INCOME_MULTIPLE;
    let detail = if coverage.is_finite() {
        format!(
            "Based on your income of {} and {} dependant(s), a starting point could be around {} in term life coverage.",
            format_dollars(ctx.income),
            ctx.dependants,
            format_dollars(coverage)
        )
    } else {
        // Income too large to multiply out; leave the figure to an advisor
        format!(
            "Based on your income of {} and {} dependant(s), term life coverage of about ten times your income is a common starting point.",
            format_dollars(ctx.income),
            ctx.dependants
        )
    };
    Recommendation::new("Consider term life insurance", detail, 1)
}

fn mortgage_recommendation(_ctx: &Context) -> Recommendation {
    Recommendation::new(
        "Protect your mortgage",
        "You indicated that you have a mortgage; term life coverage that at least covers your \
         outstanding mortgage can help protect your family home.",
        2,
    )
}

fn no_existing_life_recommendation(_ctx: &Context) -> Recommendation {
    Recommendation::new(
        "No existing life insurance detected",
        "Since you reported no existing life insurance but have dependants or a mortgage, \
         it may be worth prioritizing life coverage.",
        0,
    )
}

// ----------------------------------------------------------------------------
// Auto
// ----------------------------------------------------------------------------

static AUTO_RULES: [Rule; 3] = [
    Rule {
        id: "auto.vehicle",
        category: Category::Auto,
        delta: 30,
        applies: has_vehicle,
        recommend: None,
    },
    // TODO: mandatory-coverage guidance for provinces other than Ontario
    Rule {
        id: "auto.ontario_mandatory",
        category: Category::Auto,
        delta: 0,
        applies: drives_in_ontario,
        recommend: Some(ontario_mandatory_recommendation),
    },
    Rule {
        id: "auto.low_liability",
        category: Category::Auto,
        delta: 20,
        applies: has_low_liability_limit,
        recommend: Some(liability_limit_recommendation),
    },
];

fn has_vehicle(ctx: &Context) -> bool {
    ctx.has_vehicle
}

fn drives_in_ontario(ctx: &Context) -> bool {
    ctx.has_vehicle && ctx.province == ONTARIO
}

fn has_low_liability_limit(ctx: &Context) -> bool {
    // Zero means "not answered", not "no coverage"
    ctx.has_vehicle
        && ctx.liability_limit != 0.0
        && ctx.liability_limit < RECOMMENDED_LIABILITY_LIMIT
}

fn ontario_mandatory_recommendation(_ctx: &Context) -> Recommendation {
    Recommendation::new(
        "Mandatory Ontario auto coverage",
        "In Ontario, auto insurance is mandatory. Ensure you have at least the required \
         third-party liability, accident benefits, uninsured automobile, and DCPD coverage.",
        0,
    )
}

fn liability_limit_recommendation(_ctx: &Context) -> Recommendation {
    Recommendation::new(
        "Increase liability limit",
        "Your current liability limit appears below $2,000,000. Many Ontario drivers choose \
         a $2M limit to better protect against large claims.",
        1,
    )
}

// ----------------------------------------------------------------------------
// Home
// ----------------------------------------------------------------------------

static HOME_RULES: [Rule; 2] = [
    Rule {
        id: "home.owner",
        category: Category::Home,
        delta: 30,
        applies: owns_home,
        recommend: Some(home_review_recommendation),
    },
    Rule {
        id: "home.tenant",
        category: Category::Home,
        delta: 20,
        applies: rents_without_owning,
        recommend: Some(tenant_recommendation),
    },
];

fn owns_home(ctx: &Context) -> bool {
    ctx.owns_home
}

fn rents_without_owning(ctx: &Context) -> bool {
    ctx.rents && !ctx.owns_home
}

fn home_review_recommendation(_ctx: &Context) -> Recommendation {
    Recommendation::new(
        "Home insurance review",
        "As a homeowner, make sure your policy reflects replacement cost and any upgrades \
         (finished basement, renovations, etc.).",
        0,
    )
}

fn tenant_recommendation(_ctx: &Context) -> Recommendation {
    Recommendation::new(
        "Consider tenant insurance",
        "Tenant insurance can protect your belongings and provide liability coverage, \
         even if you don’t own the property.",
        0,
    )
}

// ----------------------------------------------------------------------------
// Travel
// ----------------------------------------------------------------------------

static TRAVEL_RULES: [Rule; 1] = [Rule {
    id: "travel.out_of_country",
    category: Category::Travel,
    delta: 30,
    applies: travels_outside_canada,
    recommend: Some(travel_medical_recommendation),
}];

fn travels_outside_canada(ctx: &Context) -> bool {
    ctx.travels_outside_canada
}

fn travel_medical_recommendation(_ctx: &Context) -> Recommendation {
    Recommendation::new(
        "Out-of-country medical coverage",
        "You mentioned travelling outside Canada. Provincial health plans generally don’t cover \
         most emergency medical costs abroad; travel medical insurance can help cover this gap.",
        0,
    )
}
