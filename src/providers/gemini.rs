use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Message;
use crate::providers::http_errors::api_request_error;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct WireContent {
    role: String,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

fn generate_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn to_wire_contents(messages: &[Message]) -> Vec<WireContent> {
    messages
        .iter()
        .map(|msg| WireContent {
            role: msg.role.as_str().to_string(),
            parts: vec![WirePart {
                text: msg.content.clone(),
            }],
        })
        .collect()
}

fn first_candidate_text(response: &GenerateContentResponse) -> String {
    // A response without text (e.g. safety-blocked) is an empty reply,
    // not an error.
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// Sends one generateContent request for `model` carrying the whole
/// conversation. The API key rides in the query string and stays out of
/// the logged URL.
pub async fn generate(
    client: &Client,
    cfg: &Config,
    model: &str,
    messages: &[Message],
) -> Result<String> {
    let api_url = generate_url(&cfg.base_url, model);
    let body = GenerateContentRequest {
        contents: to_wire_contents(messages),
        system_instruction: cfg.system.as_ref().map(|text| SystemInstruction {
            parts: vec![WirePart { text: text.clone() }],
        }),
        generation_config: GenerationConfig {
            temperature: cfg.temperature,
            max_output_tokens: cfg.max_tokens,
        },
    };
    debug!(
        api_url = %api_url,
        model = %model,
        message_count = messages.len(),
        "sending generate request"
    );

    let response = client
        .post(&api_url)
        .query(&[("key", cfg.api_key.as_str())])
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %model,
                error = %err,
                "gemini request failed"
            );
            api_request_error(err, &api_url)
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %model,
            status = %status,
            response_body_len = response_body.len(),
            "gemini returned non-success status"
        );
        // The body carries the API's prose error, which the fallback
        // classifier inspects.
        return Err(anyhow!(
            "Gemini request failed with status {}: {}",
            status,
            response_body
        ));
    }

    let parsed: GenerateContentResponse = response
        .json()
        .await
        .context("Failed to parse generate response")?;
    let text = first_candidate_text(&parsed);
    debug!(model = %model, response_len = text.len(), "received generate response");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        GenerateContentRequest, GenerateContentResponse, GenerationConfig, SystemInstruction,
        WirePart, first_candidate_text, generate_url, to_wire_contents,
    };
    use crate::model::Message;

    #[test]
    fn generate_url_trims_trailing_slash() {
        assert_eq!(
            generate_url(
                "https://generativelanguage.googleapis.com/v1beta/",
                "gemini-pro"
            ),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn request_serializes_with_camel_case_keys_and_optional_system() {
        let request = GenerateContentRequest {
            contents: to_wire_contents(&[Message::user("hi"), Message::model("hello")]),
            system_instruction: Some(SystemInstruction {
                parts: vec![WirePart {
                    text: "Be terse.".to_string(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 64,
            },
        };

        let value = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(
            value,
            json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "hi" }] },
                    { "role": "model", "parts": [{ "text": "hello" }] },
                ],
                "systemInstruction": { "parts": [{ "text": "Be terse." }] },
                "generationConfig": { "temperature": 0.5, "maxOutputTokens": 64 },
            })
        );
    }

    #[test]
    fn request_omits_system_instruction_when_absent() {
        let request = GenerateContentRequest {
            contents: to_wire_contents(&[Message::user("hi")]),
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 512,
            },
        };

        let value = serde_json::to_value(&request).expect("request should serialize");
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn first_candidate_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hi " }, { "text": "there" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } },
            ]
        }))
        .expect("response should parse");
        assert_eq!(first_candidate_text(&response), "Hi there");
    }

    #[test]
    fn missing_candidates_or_parts_yield_an_empty_reply() {
        let empty: GenerateContentResponse =
            serde_json::from_value(json!({})).expect("response should parse");
        assert_eq!(first_candidate_text(&empty), "");

        let no_content: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{}] }))
                .expect("response should parse");
        assert_eq!(first_candidate_text(&no_content), "");

        let no_parts: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "content": {} }] }))
                .expect("response should parse");
        assert_eq!(first_candidate_text(&no_parts), "");
    }
}
