//! Completing a questionnaire into a report

use tracing::info;

use crate::ai::{generate_advice, AIClient};
use crate::context::{build_context, decode_stored};
use crate::db::Database;
use crate::error::Result;
use crate::models::{QuestionnaireStatus, Report};
use crate::risk::evaluate;

/// Evaluate a questionnaire's answers, mark it completed and build its report
///
/// Completing an already-completed questionnaire re-evaluates the current
/// answers. Advice is only generated when `with_advice` is set, and falls
/// back to static text when the backend is missing or fails.
pub async fn complete_questionnaire(
    db: &Database,
    ai: Option<&AIClient>,
    id: i64,
    owner: &str,
    with_advice: bool,
) -> Result<Report> {
    // Ownership check before touching answers
    db.get_questionnaire(id, owner)?;

    let stored = db.get_answers(id)?;
    let ctx = build_context(&stored);
    let assessment = evaluate(&ctx);

    db.set_questionnaire_status(id, QuestionnaireStatus::Completed)?;

    info!(
        questionnaire_id = id,
        overall = assessment.overall_risk_score,
        recommendations = assessment.recommendation_count(),
        "Questionnaire completed"
    );

    let ai_advice = if with_advice {
        Some(generate_advice(ai, &ctx, &assessment).await)
    } else {
        None
    };

    Ok(Report {
        questionnaire_id: id,
        status: QuestionnaireStatus::Completed,
        context: stored
            .iter()
            .map(|(key, raw)| (key.clone(), decode_stored(raw)))
            .collect(),
        assessment,
        ai_advice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Advice;
    use crate::risk::Category;
    use serde_json::json;

    #[tokio::test]
    async fn test_complete_questionnaire() {
        let db = Database::in_memory().unwrap();
        let q = db.create_questionnaire("alice@example.com").unwrap();
        db.upsert_answer(q.id, "income", &json!(90000)).unwrap();
        db.upsert_answer(q.id, "dependants", &json!(2)).unwrap();
        db.upsert_answer(q.id, "occupation", &json!("nurse"))
            .unwrap();

        let report = complete_questionnaire(&db, None, q.id, "alice@example.com", true)
            .await
            .unwrap();

        assert_eq!(report.questionnaire_id, q.id);
        assert_eq!(report.status, QuestionnaireStatus::Completed);
        assert_eq!(report.context["occupation"], json!("nurse"));
        assert_eq!(report.assessment.category(Category::Life).score, 40);
        assert_eq!(report.ai_advice, Some(Advice::fallback()));

        let stored = db.get_questionnaire(q.id, "alice@example.com").unwrap();
        assert_eq!(stored.status, QuestionnaireStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_without_advice() {
        let db = Database::in_memory().unwrap();
        let q = db.create_questionnaire("alice@example.com").unwrap();

        let report = complete_questionnaire(&db, None, q.id, "alice@example.com", false)
            .await
            .unwrap();

        assert!(report.ai_advice.is_none());
        assert_eq!(report.assessment.overall_risk_score, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("ai_advice").is_none());
    }

    #[tokio::test]
    async fn test_complete_other_owner_not_found() {
        let db = Database::in_memory().unwrap();
        let q = db.create_questionnaire("alice@example.com").unwrap();

        let err = complete_questionnaire(&db, None, q.id, "bob@example.com", true)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::QuestionnaireNotFound(_)));

        // Untouched
        let stored = db.get_questionnaire(q.id, "alice@example.com").unwrap();
        assert_eq!(stored.status, QuestionnaireStatus::InProgress);
    }

    #[tokio::test]
    async fn test_complete_with_mock_advice() {
        let db = Database::in_memory().unwrap();
        let q = db.create_questionnaire("alice@example.com").unwrap();
        let ai = AIClient::mock();

        let report = complete_questionnaire(&db, Some(&ai), q.id, "alice@example.com", true)
            .await
            .unwrap();

        let advice = report.ai_advice.unwrap();
        assert_ne!(advice, Advice::fallback());
        assert!(!advice.bullets.is_empty());
    }
}
