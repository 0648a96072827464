//! Anthropic Messages API client. PDFs go up as base64 document blocks.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ChatTurn, Provider, parse_model_json, schema_instruction};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const EXTRACT_MAX_TOKENS: i32 = 4096;
const CHAT_MAX_TOKENS: i32 = 2048;

pub struct Claude {
    api_key: String,
    model: String,
}

impl Claude {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn send(&self, body: Value) -> Result<String> {
        let client = reqwest::Client::new();
        let resp = client
            .post(API_URL)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }
}

#[async_trait]
impl Provider for Claude {
    fn name(&self) -> &'static str {
        "Claude"
    }

    async fn extract_pdf(&self, pdf: &[u8], prompt: &str, schema: &Value) -> Result<Value> {
        let pdf_data = base64::engine::general_purpose::STANDARD.encode(pdf);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": EXTRACT_MAX_TOKENS,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "document",
                        "source": {
                            "type": "base64",
                            "media_type": "application/pdf",
                            "data": pdf_data,
                        },
                    },
                    {
                        "type": "text",
                        "text": schema_instruction(prompt, schema),
                    },
                ],
            }],
        });

        parse_model_json(&self.send(body).await?)
    }

    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        let messages: Vec<Msg> = turns
            .iter()
            .map(|t| Msg { role: &t.role, content: &t.content })
            .collect();

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": CHAT_MAX_TOKENS,
            "system": system,
            "messages": messages,
        });

        self.send(body).await
    }
}
