//! Database tests

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::*;
use crate::models::*;

fn answers(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    let questionnaires = db.list_questionnaires("alice@example.com").unwrap();
    assert!(questionnaires.is_empty());
}

#[test]
fn test_schema_has_unique_answer_key() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let columns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('questionnaire_answers') WHERE name IN ('questionnaire_id', 'question_key', 'answer_json', 'updated_at')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(columns, 4);
}

#[test]
fn test_create_and_get_questionnaire() {
    let db = Database::in_memory().unwrap();

    let q = db.create_questionnaire("alice@example.com").unwrap();
    assert!(q.id > 0);
    assert_eq!(q.owner, "alice@example.com");
    assert_eq!(q.status, QuestionnaireStatus::InProgress);

    let fetched = db.get_questionnaire(q.id, "alice@example.com").unwrap();
    assert_eq!(fetched.id, q.id);
}

#[test]
fn test_get_questionnaire_other_owner_is_not_found() {
    let db = Database::in_memory().unwrap();
    let q = db.create_questionnaire("alice@example.com").unwrap();

    let err = db.get_questionnaire(q.id, "bob@example.com").unwrap_err();
    assert!(matches!(err, crate::Error::QuestionnaireNotFound(_)));

    let err = db.get_questionnaire(9999, "alice@example.com").unwrap_err();
    assert!(matches!(err, crate::Error::QuestionnaireNotFound(_)));
}

#[test]
fn test_list_questionnaires_scoped_by_owner() {
    let db = Database::in_memory().unwrap();
    let first = db.create_questionnaire("alice@example.com").unwrap();
    let second = db.create_questionnaire("alice@example.com").unwrap();
    db.create_questionnaire("bob@example.com").unwrap();

    let listed = db.list_questionnaires("alice@example.com").unwrap();
    assert_eq!(listed.len(), 2);
    // Newest first
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn test_upsert_answers_last_write_wins() {
    let db = Database::in_memory().unwrap();
    let q = db.create_questionnaire("alice@example.com").unwrap();

    db.upsert_answers(q.id, &answers(&[("age", json!(35)), ("income", json!(50000))]))
        .unwrap();
    db.upsert_answer(q.id, "age", &json!(41)).unwrap();

    let stored = db.get_answers(q.id).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored["age"], "41");
    assert_eq!(stored["income"], "50000");
}

#[test]
fn test_answers_stored_as_json_text() {
    let db = Database::in_memory().unwrap();
    let q = db.create_questionnaire("alice@example.com").unwrap();

    db.upsert_answers(
        q.id,
        &answers(&[
            ("province", json!("QC")),
            ("owns_home", json!(true)),
            ("pets", json!(["dog", "cat"])),
        ]),
    )
    .unwrap();

    let stored = db.get_answers(q.id).unwrap();
    assert_eq!(stored["province"], "\"QC\"");
    assert_eq!(stored["owns_home"], "true");

    let values = db.get_answer_values(q.id).unwrap();
    assert_eq!(values["province"], json!("QC"));
    assert_eq!(values["owns_home"], json!(true));
    assert_eq!(values["pets"], json!(["dog", "cat"]));
}

#[test]
fn test_raw_answer_decodes_to_string_when_not_json() {
    let db = Database::in_memory().unwrap();
    let q = db.create_questionnaire("alice@example.com").unwrap();

    db.upsert_raw_answer(q.id, "province", "QC").unwrap();
    db.upsert_raw_answer(q.id, "age", "42").unwrap();

    let values = db.get_answer_values(q.id).unwrap();
    assert_eq!(values["province"], json!("QC"));
    assert_eq!(values["age"], json!(42));
}

#[test]
fn test_empty_question_key_rejected() {
    let db = Database::in_memory().unwrap();
    let q = db.create_questionnaire("alice@example.com").unwrap();

    let err = db
        .upsert_answers(q.id, &answers(&[("age", json!(30)), ("  ", json!(1))]))
        .unwrap_err();
    assert!(matches!(err, crate::Error::InvalidAnswer(_)));
    // Nothing from the batch was written
    assert!(db.get_answers(q.id).unwrap().is_empty());
}

#[test]
fn test_answers_isolated_per_questionnaire() {
    let db = Database::in_memory().unwrap();
    let a = db.create_questionnaire("alice@example.com").unwrap();
    let b = db.create_questionnaire("alice@example.com").unwrap();

    db.upsert_answer(a.id, "age", &json!(30)).unwrap();

    assert_eq!(db.get_answers(a.id).unwrap().len(), 1);
    assert!(db.get_answers(b.id).unwrap().is_empty());
}

#[test]
fn test_set_questionnaire_status() {
    let db = Database::in_memory().unwrap();
    let q = db.create_questionnaire("alice@example.com").unwrap();

    db.set_questionnaire_status(q.id, QuestionnaireStatus::Completed)
        .unwrap();
    let fetched = db.get_questionnaire(q.id, "alice@example.com").unwrap();
    assert_eq!(fetched.status, QuestionnaireStatus::Completed);

    let err = db
        .set_questionnaire_status(9999, QuestionnaireStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, crate::Error::QuestionnaireNotFound(_)));
}

#[test]
fn test_audit_log() {
    let db = Database::in_memory().unwrap();

    db.log_audit("alice@example.com", "create", AuditSubject::Questionnaire(1), None)
        .unwrap();
    db.log_audit(
        "alice@example.com",
        "complete",
        AuditSubject::Questionnaire(1),
        Some("overall=45"),
    )
    .unwrap();
    db.log_audit("api-key", "assess", AuditSubject::Assessment, Some("keys=3"))
        .unwrap();

    let entries = db.list_audit_log(10).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].actor, "api-key");
    assert_eq!(entries[0].subject, "assessment");
    assert_eq!(entries[0].subject_id, None);
    assert_eq!(entries[1].action, "complete");
    assert_eq!(entries[1].details.as_deref(), Some("overall=45"));
    assert_eq!(entries[2].subject, "questionnaire");
    assert_eq!(entries[2].subject_id, Some(1));

    assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
}

#[test]
fn test_derive_key_is_deterministic() {
    let a = derive_key("correct horse battery staple").unwrap();
    let b = derive_key("correct horse battery staple").unwrap();
    let c = derive_key("something else").unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
}

#[test]
fn test_encrypted_database_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encrypted.db");
    let path = path.to_string_lossy();

    {
        let db = Database::new_with_key(&path, Some("passphrase")).unwrap();
        assert!(db.is_encrypted());
        let q = db.create_questionnaire("alice@example.com").unwrap();
        db.upsert_answer(q.id, "age", &json!(35)).unwrap();
    }

    let reopened = Database::new_with_key(&path, Some("passphrase")).unwrap();
    let listed = reopened.list_questionnaires("alice@example.com").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(reopened.get_answers(listed[0].id).unwrap()["age"], "35");
}

#[test]
fn test_wrong_key_cannot_open_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.db");
    let path = path.to_string_lossy();

    {
        let db = Database::new_with_key(&path, Some("right")).unwrap();
        db.create_questionnaire("alice@example.com").unwrap();
    }

    assert!(Database::new_with_key(&path, Some("wrong")).is_err());
}

#[test]
fn test_foreign_keys_enforced_on_pooled_connections() {
    let db = Database::in_memory().unwrap();
    assert!(!db.is_encrypted());

    let conn = db.conn().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    // Answers for a questionnaire that does not exist are refused
    assert!(db.upsert_answer(9999, "age", &json!(40)).is_err());
}

#[test]
fn test_raw_answer_commits_with_timestamp_bump() {
    let db = Database::in_memory().unwrap();
    let q = db.create_questionnaire("alice@example.com").unwrap();

    db.conn()
        .unwrap()
        .execute(
            "UPDATE questionnaires SET updated_at = '2000-01-01 00:00:00' WHERE id = ?",
            [q.id],
        )
        .unwrap();

    db.upsert_raw_answer(q.id, "province", "QC").unwrap();

    let updated = db.get_questionnaire(q.id, "alice@example.com").unwrap();
    assert!(updated.updated_at.format("%Y").to_string() != "2000");
    assert_eq!(db.get_answers(q.id).unwrap()["province"], "QC");
}

#[test]
fn test_raw_answer_for_missing_questionnaire_writes_nothing() {
    let db = Database::in_memory().unwrap();

    assert!(db.upsert_raw_answer(4242, "province", "QC").is_err());

    let count: i64 = db
        .conn()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM questionnaire_answers", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
