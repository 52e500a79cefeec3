//! Audit trail of questionnaire access

use rusqlite::{params, Row};

use super::Database;
use crate::error::Result;
use crate::models::{AuditEntry, AuditSubject};

impl Database {
    /// Append an entry to the audit trail, returning its id
    pub fn log_audit(
        &self,
        actor: &str,
        action: &str,
        subject: AuditSubject,
        details: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO audit_log (actor, action, subject, subject_id, details) VALUES (?, ?, ?, ?, ?)",
            params![actor, action, subject.kind(), subject.id(), details],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent entries first
    pub fn list_audit_log(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, actor, action, subject, subject_id, details
            FROM audit_log
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(params![limit], row_to_entry)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn row_to_entry(row: &Row) -> rusqlite::Result<AuditEntry> {
    Ok(AuditEntry {
        id: row.get("id")?,
        timestamp: row.get("timestamp")?,
        actor: row.get("actor")?,
        action: row.get("action")?,
        subject: row.get("subject")?,
        subject_id: row.get("subject_id")?,
        details: row.get("details")?,
    })
}
