//! Google Gemini generateContent client. PDFs are sent inline; JSON output is
//! requested via response_mime_type, with the schema spelled out in the prompt
//! (Gemini's server-side schema dialect does not accept ours).

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;

use crate::{ChatTurn, Provider, parse_model_json, schema_instruction};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct Gemini {
    api_key: String,
    model: String,
}

impl Gemini {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }

    async fn send(&self, body: Value) -> Result<String> {
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{API_BASE}/{}:generateContent", self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("gemini error: {status} {txt}");
        }

        let out: Value = resp.json().await.context("parse gemini response")?;

        // candidates[0].content.parts[*].text
        let mut s = String::new();
        if let Some(parts) = out
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
        {
            for part in parts {
                if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                    s.push_str(text);
                }
            }
        }
        if s.is_empty() {
            bail!("gemini returned no text candidates");
        }
        Ok(s.trim().to_string())
    }
}

#[async_trait]
impl Provider for Gemini {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn extract_pdf(&self, pdf: &[u8], prompt: &str, schema: &Value) -> Result<Value> {
        let pdf_data = base64::engine::general_purpose::STANDARD.encode(pdf);

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "application/pdf",
                            "data": pdf_data,
                        },
                    },
                    { "text": schema_instruction(prompt, schema) },
                ],
            }],
            "generationConfig": { "response_mime_type": "application/json" },
        });

        parse_model_json(&self.send(body).await?)
    }

    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        // Gemini calls the assistant role "model"
        let contents: Vec<Value> = turns
            .iter()
            .map(|t| {
                let role = if t.role == "assistant" { "model" } else { "user" };
                serde_json::json!({ "role": role, "parts": [{ "text": t.content }] })
            })
            .collect();

        let body = serde_json::json!({
            "system_instruction": { "parts": [{ "text": system }] },
            "contents": contents,
        });

        self.send(body).await
    }
}
