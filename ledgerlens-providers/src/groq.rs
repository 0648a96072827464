//! Groq client (OpenAI-compatible endpoint). Groq takes no PDF input, so the
//! document's text layer is extracted locally and sent as plain text.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::openai::ChatResponse;
use crate::{ChatTurn, Provider, parse_model_json, schema_instruction};

const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub struct Groq {
    api_key: String,
    model: String,
}

impl Groq {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }

    async fn send(&self, body: Value) -> Result<String> {
        let client = reqwest::Client::new();
        let resp = client
            .post(API_URL)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("groq request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("groq error: {status} {txt}");
        }

        let out: ChatResponse = resp.json().await.context("parse groq response")?;
        Ok(out.first_content())
    }
}

#[async_trait]
impl Provider for Groq {
    fn name(&self) -> &'static str {
        "Groq"
    }

    async fn extract_pdf(&self, pdf: &[u8], prompt: &str, schema: &Value) -> Result<Value> {
        let text = pdf_extract::extract_text_from_mem(pdf)
            .map_err(|e| anyhow!("extract pdf text: {e}"))?;
        if text.trim().is_empty() {
            bail!("PDF has no extractable text layer; use a vision provider (claude, gemini)");
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": format!(
                    "{}\n\nDocument text:\n{text}",
                    schema_instruction(prompt, schema)
                ),
            }],
            "response_format": { "type": "json_object" },
            "temperature": 0,
        });

        parse_model_json(&self.send(body).await?)
    }

    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        let mut messages = vec![ChatTurn { role: "system".to_string(), content: system.to_string() }];
        messages.extend(turns.iter().cloned());

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        self.send(body).await
    }
}
