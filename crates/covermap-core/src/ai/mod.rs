//! Pluggable advice-generation backends
//!
//! Turns a context and its assessment into short plain-language advice. The
//! rule-based assessment is authoritative; advice is best-effort prose layered
//! on top of it and never changes a score or recommendation.
//!
//! # Architecture
//!
//! - `AdviceBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `OllamaBackend`, `MockBackend`
//! - [`generate_advice`]: infallible entry point that degrades to [`Advice::fallback`]
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, ollama, mock). Default: openai
//! - `OPENAI_API_KEY`: API key (required for the openai backend)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (default: https://api.openai.com)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OLLAMA_HOST`: Ollama server URL (required for the ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod prompt;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use parsing::{parse_advice, MAX_ADVICE_WORDS};
pub use prompt::{build_prompt, SYSTEM_PROMPT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::Result;
use crate::risk::AssessmentResult;

/// Plain-language advice shown next to an assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub summary: String,
    pub bullets: Vec<String>,
}

impl Advice {
    /// Static advice used when no generator is configured or it fails
    pub fn fallback() -> Self {
        Self {
            summary: "Based on your answers, review your life, home/tenant, auto, and travel \
                      insurance with a licensed advisor. Make sure your coverage limits match \
                      your income, debts, and family situation, and that your liability limits \
                      are high enough."
                .to_string(),
            bullets: vec![
                "Confirm your life insurance is enough to cover debts and support dependants."
                    .to_string(),
                "Check your home or tenant policy limits for contents and liability.".to_string(),
                "Verify your auto liability limit (often $2M is recommended in Ontario)."
                    .to_string(),
                "If you travel outside Canada, review emergency medical coverage.".to_string(),
            ],
        }
    }
}

/// Trait defining the interface for all advice backends
#[async_trait]
pub trait AdviceBackend: Send + Sync {
    /// Send a prompt and return the model's raw text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI or any server speaking the chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai` (default): Uses OPENAI_API_KEY, OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `ollama`: Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AdviceBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AdviceBackend for AIClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.complete(prompt).await,
            AIClient::Ollama(b) => b.complete(prompt).await,
            AIClient::Mock(b) => b.complete(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Generate advice for an assessment
///
/// Never fails: an unconfigured client, a backend error, or an empty reply
/// all produce [`Advice::fallback`].
pub async fn generate_advice(
    ai: Option<&AIClient>,
    ctx: &Context,
    assessment: &AssessmentResult,
) -> Advice {
    let Some(client) = ai else {
        debug!("No advice backend configured, using fallback advice");
        return Advice::fallback();
    };

    let prompt = build_prompt(&ctx.to_display_map(), assessment);

    match client.complete(&prompt).await {
        Ok(text) if !text.trim().is_empty() => parse_advice(&text),
        Ok(_) => {
            warn!(model = %client.model(), "Advice backend returned empty text, using fallback");
            Advice::fallback()
        }
        Err(e) => {
            warn!(
                model = %client.model(),
                host = %client.host(),
                error = %e,
                "Advice generation failed, using fallback"
            );
            Advice::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::evaluate;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AIClient::mock();
        assert!(client.health_check().await);
    }

    #[test]
    fn test_fallback_advice() {
        let advice = Advice::fallback();
        assert!(advice.summary.starts_with("Based on your answers"));
        assert_eq!(advice.bullets.len(), 4);
        assert!(advice.bullets[2].contains("$2M"));
    }

    #[tokio::test]
    async fn test_generate_advice_without_client_is_fallback() {
        let ctx = Context::default();
        let assessment = evaluate(&ctx);
        let advice = generate_advice(None, &ctx, &assessment).await;
        assert_eq!(advice, Advice::fallback());
    }

    #[tokio::test]
    async fn test_generate_advice_with_mock() {
        let ctx = Context::default();
        let assessment = evaluate(&ctx);
        let client = AIClient::mock();

        let advice = generate_advice(Some(&client), &ctx, &assessment).await;
        assert!(!advice.summary.is_empty());
        assert_eq!(advice.bullets.len(), 3);
        assert_ne!(advice, Advice::fallback());
    }

    #[tokio::test]
    async fn test_generate_advice_backend_failure_is_fallback() {
        let ctx = Context::default();
        let assessment = evaluate(&ctx);
        let client = AIClient::Mock(MockBackend::failing());

        let advice = generate_advice(Some(&client), &ctx, &assessment).await;
        assert_eq!(advice, Advice::fallback());
    }

    #[tokio::test]
    async fn test_generate_advice_empty_reply_is_fallback() {
        let ctx = Context::default();
        let assessment = evaluate(&ctx);
        let client = AIClient::Mock(MockBackend::with_response("   \n "));

        let advice = generate_advice(Some(&client), &ctx, &assessment).await;
        assert_eq!(advice, Advice::fallback());
    }

    #[tokio::test]
    async fn test_generate_advice_does_not_change_assessment() {
        let ctx = Context {
            income: 90000.0,
            ..Context::default()
        };
        let assessment = evaluate(&ctx);
        let before = serde_json::to_value(&assessment).unwrap();

        let client = AIClient::mock();
        let _ = generate_advice(Some(&client), &ctx, &assessment).await;

        assert_eq!(serde_json::to_value(&assessment).unwrap(), before);
    }
}
