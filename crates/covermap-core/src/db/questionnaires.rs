//! Questionnaire and answer operations

use std::collections::BTreeMap;

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use super::{parse_datetime, Database};
use crate::context::decode_stored;
use crate::error::{Error, Result};
use crate::models::{Questionnaire, QuestionnaireStatus};

impl Database {
    /// Create a new in-progress questionnaire for an owner
    pub fn create_questionnaire(&self, owner: &str) -> Result<Questionnaire> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO questionnaires (owner, status) VALUES (?, ?)",
            params![owner, QuestionnaireStatus::InProgress.as_str()],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_questionnaire(id, owner)
    }

    /// Get a questionnaire owned by `owner`
    ///
    /// Questionnaires belonging to someone else are reported as not found.
    pub fn get_questionnaire(&self, id: i64, owner: &str) -> Result<Questionnaire> {
        let conn = self.conn()?;

        conn.query_row(
            r#"
            SELECT id, owner, status, created_at, updated_at
            FROM questionnaires
            WHERE id = ? AND owner = ?
            "#,
            params![id, owner],
            row_to_questionnaire,
        )
        .optional()?
        .ok_or_else(|| Error::QuestionnaireNotFound(id))
    }

    /// List an owner's questionnaires, newest first
    pub fn list_questionnaires(&self, owner: &str) -> Result<Vec<Questionnaire>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner, status, created_at, updated_at
            FROM questionnaires
            WHERE owner = ?
            ORDER BY id DESC
            "#,
        )?;

        let questionnaires = stmt
            .query_map(params![owner], row_to_questionnaire)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(questionnaires)
    }

    /// Update a questionnaire's status
    pub fn set_questionnaire_status(&self, id: i64, status: QuestionnaireStatus) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE questionnaires SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![status.as_str(), id],
        )?;

        if updated == 0 {
            return Err(Error::QuestionnaireNotFound(id));
        }
        Ok(())
    }

    /// Store one answer, replacing any previous value for the same key
    pub fn upsert_answer(&self, questionnaire_id: i64, key: &str, value: &Value) -> Result<()> {
        let mut answers = BTreeMap::new();
        answers.insert(key.to_string(), value.clone());
        self.upsert_answers(questionnaire_id, &answers)
    }

    /// Store several answers atomically (last write wins per key)
    pub fn upsert_answers(
        &self,
        questionnaire_id: i64,
        answers: &BTreeMap<String, Value>,
    ) -> Result<()> {
        for key in answers.keys() {
            validate_key(key)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for (key, value) in answers {
            let answer_json = serde_json::to_string(value)?;
            tx.execute(
                r#"
                INSERT INTO questionnaire_answers (questionnaire_id, question_key, answer_json)
                VALUES (?, ?, ?)
                ON CONFLICT(questionnaire_id, question_key) DO UPDATE SET
                    answer_json = excluded.answer_json,
                    updated_at = CURRENT_TIMESTAMP
                "#,
                params![questionnaire_id, key, answer_json],
            )?;
        }

        tx.execute(
            "UPDATE questionnaires SET updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![questionnaire_id],
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Store an answer exactly as given, without JSON encoding
    ///
    /// Used for answers captured as free text (e.g. from the CLI) that may or
    /// may not be valid JSON.
    pub fn upsert_raw_answer(&self, questionnaire_id: i64, key: &str, raw: &str) -> Result<()> {
        validate_key(key)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO questionnaire_answers (questionnaire_id, question_key, answer_json)
            VALUES (?, ?, ?)
            ON CONFLICT(questionnaire_id, question_key) DO UPDATE SET
                answer_json = excluded.answer_json,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![questionnaire_id, key, raw],
        )?;
        tx.execute(
            "UPDATE questionnaires SET updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![questionnaire_id],
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Stored answer text keyed by question
    pub fn get_answers(&self, questionnaire_id: i64) -> Result<BTreeMap<String, String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT question_key, answer_json FROM questionnaire_answers WHERE questionnaire_id = ?",
        )?;

        let answers = stmt
            .query_map(params![questionnaire_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

        Ok(answers)
    }

    /// Answers decoded from JSON (raw text when decoding fails)
    pub fn get_answer_values(&self, questionnaire_id: i64) -> Result<BTreeMap<String, Value>> {
        Ok(self
            .get_answers(questionnaire_id)?
            .iter()
            .map(|(key, raw)| (key.clone(), decode_stored(raw)))
            .collect())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::InvalidAnswer("question key must not be empty".to_string()));
    }
    Ok(())
}

fn row_to_questionnaire(row: &rusqlite::Row) -> rusqlite::Result<Questionnaire> {
    let status_str: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Questionnaire {
        id: row.get(0)?,
        owner: row.get(1)?,
        status: status_str
            .parse()
            .unwrap_or(QuestionnaireStatus::InProgress),
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}
