//! Questionnaire commands

use anyhow::{Context, Result};
use covermap_core::context::{decode_stored, is_recognized};
use covermap_core::db::Database;
use covermap_core::AuditSubject;
use serde_json::Value;

/// Start a new questionnaire, returning its ID
pub fn cmd_new(db: &Database, owner: &str) -> Result<i64> {
    let questionnaire = db
        .create_questionnaire(owner)
        .context("Failed to create questionnaire")?;

    db.log_audit(
        owner,
        "create",
        AuditSubject::Questionnaire(questionnaire.id),
        Some("via cli"),
    )?;

    println!("📝 Started questionnaire #{}", questionnaire.id);
    println!();
    println!("Record answers with:");
    println!("  covermap answer {} income 90000", questionnaire.id);
    println!("  covermap answer {} province QC", questionnaire.id);

    Ok(questionnaire.id)
}

/// Record one answer as typed on the command line
///
/// The text is stored verbatim; JSON literals (`90000`, `true`) keep their
/// type and anything else is read back as a string.
pub fn cmd_answer(db: &Database, owner: &str, id: i64, key: &str, value: &str) -> Result<()> {
    db.get_questionnaire(id, owner)?;
    db.upsert_raw_answer(id, key, value)
        .with_context(|| format!("Failed to store answer for '{}'", key))?;

    db.log_audit(
        owner,
        "update_answers",
        AuditSubject::Questionnaire(id),
        Some("keys=1"),
    )?;

    println!("✅ #{} {} = {}", id, key, display_value(&decode_stored(value)));
    if !is_recognized(key) {
        println!("   ℹ️  '{}' is not used for scoring; it is kept with the answers", key);
    }

    Ok(())
}

pub fn cmd_show(db: &Database, owner: &str, id: i64) -> Result<()> {
    let questionnaire = db.get_questionnaire(id, owner)?;
    let answers = db.get_answer_values(id)?;

    println!(
        "📋 Questionnaire #{} ({})",
        questionnaire.id,
        questionnaire.status.as_str()
    );
    println!(
        "   Updated: {}",
        questionnaire.updated_at.format("%Y-%m-%d %H:%M")
    );
    println!();

    if answers.is_empty() {
        println!("   No answers yet.");
        return Ok(());
    }

    let width = answers.keys().map(|k| k.len()).max().unwrap_or(0);
    for (key, value) in &answers {
        println!("   {:<width$}  {}", key, display_value(value), width = width);
    }

    Ok(())
}

pub fn cmd_list(db: &Database, owner: &str) -> Result<()> {
    let questionnaires = db.list_questionnaires(owner)?;

    if questionnaires.is_empty() {
        println!("No questionnaires yet. Start one with: covermap new");
        return Ok(());
    }

    println!("📋 Questionnaires for {}", owner);
    println!();
    for q in &questionnaires {
        println!(
            "  #{:<5} {:<12} created {}",
            q.id,
            q.status.as_str(),
            q.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

/// Render an answer without JSON quoting for strings
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
