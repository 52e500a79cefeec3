//! Prompt construction for advice generation

use std::collections::BTreeMap;

use serde_json::Value;

use crate::risk::AssessmentResult;

/// Sampling temperature for advice generation
pub const TEMPERATURE: f32 = 0.4;

/// Completion token cap; generous for a 250-word answer
pub const MAX_TOKENS: u32 = 400;

/// System message sent ahead of every advice prompt
pub const SYSTEM_PROMPT: &str = "You are a helpful Canadian insurance explainer. \
    You ONLY provide general education and suggest topics to discuss with a licensed advisor.";

const INSTRUCTIONS: &str = "You are an insurance assistant helping a Canadian consumer \
    understand their insurance coverage situation. Be clear, neutral and educational. \
    Do NOT give legal or tax advice, and do not recommend specific company products. \
    Focus on concepts and what they should discuss with a licensed advisor.";

const OUTPUT_REQUEST: &str = "Based on this, write:\n\
    1) A short 3-5 sentence overview of their situation.\n\
    2) 3-5 bullet points with concrete next steps or questions to ask an insurance advisor.\n\
    Keep total length under 250 words.";

/// Build the user prompt from the answers shown to the user and their assessment
pub fn build_prompt(answers: &BTreeMap<String, Value>, assessment: &AssessmentResult) -> String {
    let mut lines = vec![INSTRUCTIONS.to_string(), String::new()];

    lines.push("User profile (raw answers):".to_string());
    for (key, value) in answers {
        lines.push(format!("- {}: {}", key, display_value(value)));
    }

    lines.push(String::new());
    lines.push("Rule-based assessment (JSON):".to_string());
    lines.push(serde_json::to_string(assessment).unwrap_or_else(|_| "{}".to_string()));

    lines.push(String::new());
    lines.push(OUTPUT_REQUEST.to_string());

    lines.join("\n")
}

// Strings are shown bare; everything else uses its JSON text
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
