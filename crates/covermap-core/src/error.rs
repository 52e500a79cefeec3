//! Error types for covermap
//!
//! The Context Builder and Risk Evaluator never produce errors. Everything here
//! belongs to the collaborators around them: persistence and the advice generator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Key derivation failed or no passphrase was supplied
    #[error("Database key error: {0}")]
    DatabaseKey(String),

    #[error("Advice request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An answer the store refuses to write (e.g. a blank question key)
    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    /// Missing, or owned by someone else; the two are indistinguishable
    #[error("Questionnaire {0} not found")]
    QuestionnaireNotFound(i64),

    #[error("Advice generator error: {0}")]
    Advice(String),
}

pub type Result<T> = std::result::Result<T, Error>;
