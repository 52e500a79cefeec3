//! Assessment commands

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use covermap_core::db::Database;
use covermap_core::models::Report;
use covermap_core::{
    complete_questionnaire, evaluate, AIClient, Advice, AssessmentResult, AuditSubject,
};
use serde_json::Value;

/// Complete a stored questionnaire and print its report
pub async fn cmd_assess(
    db: &Database,
    ai: Option<&AIClient>,
    owner: &str,
    id: i64,
    json: bool,
    no_advice: bool,
) -> Result<Report> {
    let report = complete_questionnaire(db, ai, id, owner, !no_advice)
        .await
        .with_context(|| format!("Failed to assess questionnaire #{}", id))?;

    db.log_audit(
        owner,
        "complete",
        AuditSubject::Questionnaire(id),
        Some(&format!(
            "overall={}",
            report.assessment.overall_risk_score
        )),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("🛡️  Risk report for questionnaire #{}", id);
        println!();
        print_assessment(&report.assessment);
        if let Some(advice) = &report.ai_advice {
            print_advice(advice);
        }
    }

    Ok(report)
}

/// Evaluate an answers file without touching the database
pub fn cmd_evaluate(file: &Path, json: bool) -> Result<AssessmentResult> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let answers: BTreeMap<String, Value> = match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => bail!("{} must hold a JSON object of answers", file.display()),
    };

    let assessment = evaluate(&covermap_core::Context::from_values(&answers));

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        println!("🛡️  Risk assessment for {}", file.display());
        println!();
        print_assessment(&assessment);
    }

    Ok(assessment)
}

fn print_assessment(assessment: &AssessmentResult) {
    println!("   Overall risk score: {}/100", assessment.overall_risk_score);
    println!();

    for (category, result) in &assessment.categories {
        let marker = if result.score == 0 { "  " } else { "⚠️" };
        println!("   {} {:<8} {:>3}", marker, category.as_str(), result.score);
        for rec in &result.recommendations {
            println!("        • {}: {}", rec.title, rec.detail);
        }
    }

    if assessment.recommendation_count() == 0 {
        println!();
        println!("   ✅ No coverage gaps found");
    }
}

fn print_advice(advice: &Advice) {
    println!();
    println!("💡 {}", advice.summary);
    for bullet in &advice.bullets {
        println!("   - {}", bullet);
    }
}
