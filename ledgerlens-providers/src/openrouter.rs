//! OpenRouter client: OpenAI-compatible API fronting many models. PDFs are
//! attached as base64 file parts.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::openai::ChatResponse;
use crate::{ChatTurn, Provider, parse_model_json, schema_instruction};

const API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

pub struct OpenRouter {
    api_key: String,
    model: String,
}

impl OpenRouter {
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
            .context("openrouter request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openrouter error: {status} {txt}");
        }

        let out: ChatResponse = resp.json().await.context("parse openrouter response")?;
        Ok(out.first_content())
    }
}

#[async_trait]
impl Provider for OpenRouter {
    fn name(&self) -> &'static str {
        "OpenRouter"
    }

    async fn extract_pdf(&self, pdf: &[u8], prompt: &str, schema: &Value) -> Result<Value> {
        let pdf_data = base64::engine::general_purpose::STANDARD.encode(pdf);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": schema_instruction(prompt, schema) },
                    {
                        "type": "file",
                        "file": {
                            "filename": "statement.pdf",
                            "file_data": format!("data:application/pdf;base64,{pdf_data}"),
                        },
                    },
                ],
            }],
            "response_format": { "type": "json_object" },
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
