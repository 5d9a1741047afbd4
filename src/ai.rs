//! AI summarization integration.
//!
//! Forwards constructed prompts to an externally configured chat-completion
//! endpoint (OpenAI-compatible shape) and parses a JSON object out of the
//! reply, tolerating markdown code fences around it. Upstream failures and
//! malformed replies surface to the caller unchanged; there are no retries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DbStory;

const SYSTEM_PROMPT: &str = "You are an expert TPM-input director.";
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("AI reply was not valid JSON: {0}")]
    BadReply(String),
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

/// The weekly summary the provider is asked to produce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    #[serde(default)]
    pub accomplishments: String,
    #[serde(default)]
    pub next_week_plan: String,
    #[serde(default)]
    pub blockers: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MitigationReply {
    #[serde(default)]
    mitigation: String,
}

// ============================================================================
// Prompt construction
// ============================================================================

/// Build the weekly-summary prompt from a week's stories.
pub fn weekly_summary_prompt(stories: &[DbStory]) -> String {
    let story_lines = stories
        .iter()
        .map(|s| {
            format!(
                "- Title: {}\n  Status: {}\n  Story Points: {}\n  Description: {}\n  \
                 Comments: {}\n  Risks & Mitigation: {}\n  Blockers: {}\n  Pulled Date: {}",
                s.title,
                s.status.as_str(),
                s.points,
                s.description.as_deref().unwrap_or("N/A"),
                s.comments.as_deref().unwrap_or("N/A"),
                s.risk_notes.as_deref().unwrap_or("N/A"),
                s.blocker_notes.as_deref().unwrap_or("N/A"),
                s.pulled_date.as_deref().unwrap_or("N/A"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a TPM-input director. Analyze the following project update tracking \
         information and generate a concise weekly summary.\n\
         Focus on identifying real progress, blockers, and next steps across teams based \
         on descriptions, status, and comments.\n\n\
         Stories:\n{story_lines}\n\n\
         Please return ONLY a JSON object with strictly these keys:\n\
         {{\n  \"accomplishments\": \"Brief summary of Completed/Done work...\",\n  \
         \"nextWeekPlan\": \"Brief summary of To Do/In Progress work and next actions...\",\n  \
         \"blockers\": \"Any risks/blockers identified...\"\n}}"
    )
}

/// Build the risk-mitigation prompt.
pub fn mitigation_prompt(risk_description: &str) -> String {
    format!(
        "You are a TPM-input director. Based on the following project risk, suggest a \
         concise and actionable mitigation strategy (1-2 sentences max).\n\n\
         Risk: {risk_description}\n\n\
         Return ONLY a JSON object with this key: {{ \"mitigation\": \"...\" }}"
    )
}

// ============================================================================
// Reply parsing
// ============================================================================

/// Strip a surrounding markdown code fence, if any, and return the inner text.
fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    for opener in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(opener) {
            return rest.strip_suffix("```").unwrap_or(rest).trim();
        }
    }
    trimmed
}

/// Parse a JSON object out of a (possibly fenced) provider reply.
pub fn parse_reply(reply: &str) -> Result<serde_json::Value, AiError> {
    let inner = strip_fences(reply);
    serde_json::from_str(inner).map_err(|e| AiError::BadReply(format!("{e}: {inner}")))
}

// ============================================================================
// Provider calls
// ============================================================================

async fn complete(config: &crate::config::AiConfig, prompt: &str) -> Result<String, AiError> {
    let client = reqwest::Client::new();
    let request = ChatRequest {
        model: &config.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        temperature: TEMPERATURE,
    };

    let resp = client
        .post(&config.base_url)
        .bearer_auth(&config.api_key)
        .json(&request)
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AiError::Provider(format!("AI Provider Error: {body}")));
    }

    let body: ChatResponse = resp.json().await?;
    body.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| AiError::Provider("AI reply had no choices".to_string()))
}

/// Summarize a week's stories into the report narrative fields.
pub async fn summarize_weekly(
    config: &crate::config::AiConfig,
    stories: &[DbStory],
) -> Result<WeeklySummary, AiError> {
    let prompt = weekly_summary_prompt(stories);
    let reply = complete(config, &prompt).await?;
    let value = parse_reply(&reply)?;
    serde_json::from_value(value).map_err(|e| AiError::BadReply(e.to_string()))
}

/// Suggest a mitigation for a free-text risk description.
pub async fn suggest_mitigation(
    config: &crate::config::AiConfig,
    risk_description: &str,
) -> Result<String, AiError> {
    let prompt = mitigation_prompt(risk_description);
    let reply = complete(config, &prompt).await?;
    let value = parse_reply(&reply)?;
    let parsed: MitigationReply =
        serde_json::from_value(value).map_err(|e| AiError::BadReply(e.to_string()))?;
    Ok(parsed.mitigation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoryStatus;

    #[test]
    fn parse_bare_json_reply() {
        let value = parse_reply(r#"{"mitigation": "Add a fallback."}"#).expect("parse");
        assert_eq!(value["mitigation"], "Add a fallback.");
    }

    #[test]
    fn parse_json_fenced_reply() {
        let reply = "```json\n{\"accomplishments\": \"a\", \"nextWeekPlan\": \"b\", \"blockers\": \"c\"}\n```";
        let value = parse_reply(reply).expect("parse");
        let summary: WeeklySummary = serde_json::from_value(value).expect("shape");
        assert_eq!(summary.accomplishments, "a");
        assert_eq!(summary.next_week_plan, "b");
        assert_eq!(summary.blockers, "c");
    }

    #[test]
    fn parse_plain_fenced_reply() {
        let reply = "```\n{\"mitigation\": \"x\"}\n```";
        let value = parse_reply(reply).expect("parse");
        assert_eq!(value["mitigation"], "x");
    }

    #[test]
    fn non_json_reply_is_an_error() {
        assert!(matches!(
            parse_reply("Sorry, I cannot help with that."),
            Err(AiError::BadReply(_))
        ));
    }

    #[test]
    fn summary_prompt_lists_every_story() {
        let mut story = crate::db::test_utils::sample_story("CPR-101", "proj1", "2026-W08");
        story.status = StoryStatus::Done;
        story.risk_notes = Some("rate limits".to_string());
        let prompt = weekly_summary_prompt(&[story]);
        assert!(prompt.contains("Title: Story CPR-101"));
        assert!(prompt.contains("Status: done"));
        assert!(prompt.contains("Risks & Mitigation: rate limits"));
        assert!(prompt.contains("\"nextWeekPlan\""));
    }

    #[test]
    fn mitigation_prompt_embeds_risk() {
        let prompt = mitigation_prompt("Key developer departure");
        assert!(prompt.contains("Risk: Key developer departure"));
        assert!(prompt.contains("\"mitigation\""));
    }
}
