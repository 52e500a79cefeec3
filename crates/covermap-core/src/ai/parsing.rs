//! Splitting free-form model output into summary and bullets

use std::sync::OnceLock;

use regex::Regex;

use super::Advice;

/// Upper bound on words across summary and bullets
pub const MAX_ADVICE_WORDS: usize = 250;

// `-` and `•` may hug the text; `*` and numbered markers need a space so
// markdown emphasis and figures like "2024." are not taken for bullets.
fn bullet_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[-•]\s*|\*\s+|\d{1,2}[.)]\s+)(.*)$").expect("valid regex")
    })
}

/// Parse model output into [`Advice`]
///
/// Lines before the first bullet marker form the summary; every line from the
/// first marker on is a bullet. With no summary lines the whole text becomes
/// the summary. The result is capped at [`MAX_ADVICE_WORDS`].
pub fn parse_advice(text: &str) -> Advice {
    let marker = bullet_marker();

    let mut summary_lines = Vec::new();
    let mut bullets = Vec::new();
    let mut in_bullets = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = marker.captures(line) {
            in_bullets = true;
            let stripped = caps.get(1).map_or("", |m| m.as_str()).trim();
            if !stripped.is_empty() {
                bullets.push(stripped.to_string());
            }
        } else if in_bullets {
            bullets.push(line.to_string());
        } else {
            summary_lines.push(line);
        }
    }

    let summary = if summary_lines.is_empty() {
        text.trim().to_string()
    } else {
        summary_lines.join(" ")
    };

    cap_words(
        Advice { summary, bullets },
        MAX_ADVICE_WORDS,
    )
}

/// Truncate advice to `limit` words, summary first then bullets in order
fn cap_words(advice: Advice, limit: usize) -> Advice {
    let mut remaining = limit;

    let summary = take_words(&advice.summary, &mut remaining);

    let mut bullets = Vec::new();
    for bullet in &advice.bullets {
        if remaining == 0 {
            break;
        }
        bullets.push(take_words(bullet, &mut remaining));
    }

    Advice { summary, bullets }
}

fn take_words(text: &str, remaining: &mut usize) -> String {
    let count = text.split_whitespace().count();
    if count <= *remaining {
        *remaining -= count;
        return text.to_string();
    }

    let truncated = text
        .split_whitespace()
        .take(*remaining)
        .collect::<Vec<_>>()
        .join(" ");
    *remaining = 0;
    truncated
}
