//! Data models for covermap

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::Advice;
use crate::risk::AssessmentResult;

/// Lifecycle of a questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionnaireStatus {
    /// Answers are still being collected
    InProgress,
    /// An assessment has been produced
    Completed,
}

impl QuestionnaireStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionnaireStatus::InProgress => "in_progress",
            QuestionnaireStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QuestionnaireStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionnaireStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(QuestionnaireStatus::InProgress),
            "completed" => Ok(QuestionnaireStatus::Completed),
            _ => Err(format!("Unknown questionnaire status: {}", s)),
        }
    }
}

/// A questionnaire owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: i64,
    /// Identity of the owner as reported by the upstream auth layer
    pub owner: String,
    pub status: QuestionnaireStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A questionnaire together with its decoded answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionnaireWithAnswers {
    pub id: i64,
    pub status: QuestionnaireStatus,
    pub answers: BTreeMap<String, Value>,
}

impl QuestionnaireWithAnswers {
    pub fn new(questionnaire: &Questionnaire, answers: BTreeMap<String, Value>) -> Self {
        Self {
            id: questionnaire.id,
            status: questionnaire.status,
            answers,
        }
    }
}

/// Payload returned when a questionnaire is completed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub questionnaire_id: i64,
    pub status: QuestionnaireStatus,
    /// Answers as submitted (decoded), including unrecognized questions
    pub context: BTreeMap<String, Value>,
    pub assessment: AssessmentResult,
    /// Generated or fallback advice, absent when advice was not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_advice: Option<Advice>,
}

/// What an audited action touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSubject {
    Questionnaire(i64),
    /// The caller's questionnaire list
    Questionnaires,
    /// A stateless evaluation; nothing stored
    Assessment,
    AuditLog,
}

impl AuditSubject {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditSubject::Questionnaire(_) | AuditSubject::Questionnaires => "questionnaire",
            AuditSubject::Assessment => "assessment",
            AuditSubject::AuditLog => "audit_log",
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            AuditSubject::Questionnaire(id) => Some(*id),
            _ => None,
        }
    }
}

/// One recorded access or change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    /// Caller identity (proxy user, "api-key", or the CLI owner)
    pub actor: String,
    pub action: String,
    /// Subject kind, e.g. "questionnaire"
    pub subject: String,
    pub subject_id: Option<i64>,
    pub details: Option<String>,
}
