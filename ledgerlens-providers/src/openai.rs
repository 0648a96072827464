//! OpenAI chat-completions client. Extraction uses a json_schema response
//! format built from the document schema; PDFs ride along as a base64 file part.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;

use crate::{ChatTurn, Provider, parse_model_json};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const CHAT_TEMPERATURE: f32 = 0.4;

pub struct OpenAi {
    api_key: String,
    model: String,
}

impl OpenAi {
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
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: ChatResponse = resp.json().await.context("parse openai response")?;
        Ok(out.first_content())
    }
}

#[async_trait]
impl Provider for OpenAi {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn extract_pdf(&self, pdf: &[u8], prompt: &str, schema: &Value) -> Result<Value> {
        let pdf_data = base64::engine::general_purpose::STANDARD.encode(pdf);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    {
                        "type": "file",
                        "file": {
                            "filename": "statement.pdf",
                            "file_data": format!("data:application/pdf;base64,{pdf_data}"),
                        },
                    },
                ],
            }],
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "extraction", "schema": schema },
            },
        });

        parse_model_json(&self.send(body).await?)
    }

    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        let mut messages = vec![ChatTurn { role: "system".to_string(), content: system.to_string() }];
        messages.extend(turns.iter().cloned());

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": CHAT_TEMPERATURE,
        });

        self.send(body).await
    }
}

/// Shared response shape for the OpenAI-compatible providers
#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

impl ChatResponse {
    pub(crate) fn first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}
