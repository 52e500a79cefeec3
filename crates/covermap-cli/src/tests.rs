//! CLI command tests

use std::io::Write;

use covermap_core::db::Database;
use covermap_core::models::QuestionnaireStatus;
use covermap_core::{AIClient, Advice, Category};
use serde_json::json;

use crate::commands::{self, display_value};

const OWNER: &str = "cli@example.com";

fn answers_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ========== Database Command Tests ==========

#[test]
fn test_open_db_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cli.db");

    let db = commands::open_db(&path, true).unwrap();
    assert!(path.exists());
    assert!(!db.is_encrypted());
}

#[test]
fn test_cmd_init() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.db");

    commands::cmd_init(&path, true).unwrap();

    let db = commands::open_db(&path, true).unwrap();
    assert!(db.list_questionnaires(OWNER).unwrap().is_empty());
}

#[test]
fn test_cmd_audit_empty_and_populated() {
    let db = Database::in_memory().unwrap();
    assert!(commands::cmd_audit(&db, 20).is_ok());

    commands::cmd_new(&db, OWNER).unwrap();
    assert!(commands::cmd_audit(&db, 20).is_ok());
    assert!(commands::cmd_audit(&db, 0).is_ok());
}

// ========== Questionnaire Command Tests ==========

#[test]
fn test_cmd_new_creates_owned_questionnaire() {
    let db = Database::in_memory().unwrap();

    let id = commands::cmd_new(&db, OWNER).unwrap();

    let q = db.get_questionnaire(id, OWNER).unwrap();
    assert_eq!(q.status, QuestionnaireStatus::InProgress);
    assert!(db.get_questionnaire(id, "someone-else").is_err());

    let audit = db.list_audit_log(10).unwrap();
    assert_eq!(audit[0].action, "create");
    assert_eq!(audit[0].actor, OWNER);
    assert_eq!(audit[0].subject_id, Some(id));
}

#[test]
fn test_cmd_answer_keeps_json_literals_and_plain_text() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();

    commands::cmd_answer(&db, OWNER, id, "income", "90000").unwrap();
    commands::cmd_answer(&db, OWNER, id, "has_vehicle", "true").unwrap();
    commands::cmd_answer(&db, OWNER, id, "province", "QC").unwrap();

    let values = db.get_answer_values(id).unwrap();
    assert_eq!(values["income"], json!(90000));
    assert_eq!(values["has_vehicle"], json!(true));
    assert_eq!(values["province"], json!("QC"));
}

#[test]
fn test_cmd_answer_overwrites() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();

    commands::cmd_answer(&db, OWNER, id, "dependants", "1").unwrap();
    commands::cmd_answer(&db, OWNER, id, "dependants", "3").unwrap();

    assert_eq!(db.get_answers(id).unwrap()["dependants"], "3");
}

#[test]
fn test_cmd_answer_rejects_other_owner() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();

    assert!(commands::cmd_answer(&db, "intruder", id, "income", "1").is_err());
    assert!(db.get_answers(id).unwrap().is_empty());
}

#[test]
fn test_cmd_answer_rejects_empty_key() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();

    assert!(commands::cmd_answer(&db, OWNER, id, "  ", "1").is_err());
}

#[test]
fn test_cmd_show_and_list() {
    let db = Database::in_memory().unwrap();
    assert!(commands::cmd_list(&db, OWNER).is_ok());

    let id = commands::cmd_new(&db, OWNER).unwrap();
    assert!(commands::cmd_show(&db, OWNER, id).is_ok());

    commands::cmd_answer(&db, OWNER, id, "rents", "true").unwrap();
    assert!(commands::cmd_show(&db, OWNER, id).is_ok());
    assert!(commands::cmd_list(&db, OWNER).is_ok());

    assert!(commands::cmd_show(&db, OWNER, id + 100).is_err());
}

#[test]
fn test_display_value() {
    assert_eq!(display_value(&json!("QC")), "QC");
    assert_eq!(display_value(&json!(90000)), "90000");
    assert_eq!(display_value(&json!(true)), "true");
}

// ========== Assessment Command Tests ==========

#[tokio::test]
async fn test_cmd_assess_completes_and_scores() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();
    commands::cmd_answer(&db, OWNER, id, "income", "90000").unwrap();
    commands::cmd_answer(&db, OWNER, id, "dependants", "2").unwrap();
    commands::cmd_answer(&db, OWNER, id, "has_vehicle", "yes").unwrap();

    let report = commands::cmd_assess(&db, None, OWNER, id, false, false)
        .await
        .unwrap();

    // life: term 30 + no existing policy 10; auto: vehicle 30 + ON 0
    assert_eq!(report.assessment.category(Category::Life).score, 40);
    assert_eq!(report.assessment.category(Category::Auto).score, 30);
    assert_eq!(report.assessment.overall_risk_score, 35);
    assert_eq!(report.ai_advice, Some(Advice::fallback()));

    let q = db.get_questionnaire(id, OWNER).unwrap();
    assert_eq!(q.status, QuestionnaireStatus::Completed);

    let audit = db.list_audit_log(1).unwrap();
    assert_eq!(audit[0].action, "complete");
    assert_eq!(audit[0].details.as_deref(), Some("overall=35"));
}

#[tokio::test]
async fn test_cmd_assess_json_without_advice() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();

    let report = commands::cmd_assess(&db, None, OWNER, id, true, true)
        .await
        .unwrap();

    assert_eq!(report.assessment.overall_risk_score, 0);
    assert!(report.ai_advice.is_none());
}

#[tokio::test]
async fn test_cmd_assess_with_mock_backend() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();
    commands::cmd_answer(&db, OWNER, id, "travels_outside_canada", "true").unwrap();

    let ai = AIClient::mock();
    let report = commands::cmd_assess(&db, Some(&ai), OWNER, id, false, false)
        .await
        .unwrap();

    let advice = report.ai_advice.unwrap();
    assert_ne!(advice, Advice::fallback());
    assert!(!advice.summary.is_empty());
    assert_eq!(advice.bullets.len(), 3);
}

#[tokio::test]
async fn test_cmd_assess_other_owner_fails() {
    let db = Database::in_memory().unwrap();
    let id = commands::cmd_new(&db, OWNER).unwrap();

    assert!(commands::cmd_assess(&db, None, "intruder", id, false, true)
        .await
        .is_err());
    let q = db.get_questionnaire(id, OWNER).unwrap();
    assert_eq!(q.status, QuestionnaireStatus::InProgress);
}

#[test]
fn test_cmd_evaluate_file() {
    let file = answers_file(
        r#"{"income": 90000, "dependants": 2, "has_existing_life": true,
            "rents": true, "travels_outside_canada": true}"#,
    );

    let result = commands::cmd_evaluate(file.path(), false).unwrap();

    assert_eq!(result.category(Category::Life).score, 30);
    assert_eq!(result.category(Category::Home).score, 20);
    assert_eq!(result.category(Category::Travel).score, 30);
    // (30 + 20 + 30) / 3
    assert_eq!(result.overall_risk_score, 26);
}

#[test]
fn test_cmd_evaluate_json_output() {
    let file = answers_file("{}");
    let result = commands::cmd_evaluate(file.path(), true).unwrap();
    assert_eq!(result.overall_risk_score, 0);
    assert_eq!(result.categories.len(), 4);
}

#[test]
fn test_cmd_evaluate_rejects_bad_files() {
    let not_json = answers_file("income=90000");
    assert!(commands::cmd_evaluate(not_json.path(), false).is_err());

    let not_object = answers_file("[1, 2, 3]");
    assert!(commands::cmd_evaluate(not_object.path(), false).is_err());

    let missing = std::path::Path::new("/nonexistent/answers.json");
    assert!(commands::cmd_evaluate(missing, false).is_err());
}
