//! Mock backend for testing
//!
//! Returns canned advice text without any network access.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AdviceBackend;

const DEFAULT_RESPONSE: &str = "Your answers point to a few coverage areas worth reviewing. \
Income replacement and liability limits stand out as the main gaps.\n\
- Ask an advisor how much term life coverage fits your income and debts.\n\
- Compare your current auto liability limit against a $2M limit.\n\
- Check whether your home or tenant policy covers personal liability.";

/// Mock advice backend for testing
///
/// Returns a fixed reply, or fails every request when built with
/// [`MockBackend::failing`].
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    response: Option<String>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, canned three-bullet reply)
    pub fn new() -> Self {
        Self {
            healthy: true,
            response: Some(DEFAULT_RESPONSE.to_string()),
        }
    }

    /// Create a mock that replies with `text`
    pub fn with_response(text: &str) -> Self {
        Self {
            healthy: true,
            response: Some(text.to_string()),
        }
    }

    /// Create an unhealthy mock whose completions always fail
    pub fn failing() -> Self {
        Self {
            healthy: false,
            response: None,
        }
    }
}

#[async_trait]
impl AdviceBackend for MockBackend {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.response
            .clone()
            .ok_or_else(|| Error::Advice("mock backend configured to fail".to_string()))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let backend = MockBackend::new();
        let text = backend.complete("anything").await.unwrap();
        assert!(text.contains("- Ask an advisor"));
    }

    #[tokio::test]
    async fn test_mock_custom_response() {
        let backend = MockBackend::with_response("hello");
        assert_eq!(backend.complete("prompt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let backend = MockBackend::failing();
        assert!(!backend.health_check().await);
        assert!(matches!(
            backend.complete("prompt").await,
            Err(Error::Advice(_))
        ));
    }
}
