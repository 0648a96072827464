//! ledgerlens-providers: vendor LLM clients behind one extraction/completion trait.
//!
//! Every provider does the same two jobs: turn a PDF into schema-shaped JSON,
//! and answer a chat turn. The marshaling differs per vendor; nothing else does.

pub mod claude;
pub mod gemini;
pub mod groq;
pub mod insights;
pub mod openai;
pub mod openrouter;
pub mod prompts;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use insights::InsightsAgent;

/// One message in a conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

/// A vendor client. `extract_pdf` returns raw JSON; use [`extract_document`]
/// for the typed version.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extract structured data from a PDF per `prompt`, shaped by `schema`
    async fn extract_pdf(&self, pdf: &[u8], prompt: &str, schema: &Value) -> Result<Value>;

    /// Plain chat completion
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String>;
}

/// Which vendor to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Claude,
    OpenAi,
    Gemini,
    Groq,
    OpenRouter,
}

impl ProviderKind {
    pub const ALL: &[ProviderKind] = &[
        ProviderKind::Claude,
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
        ProviderKind::Groq,
        ProviderKind::OpenRouter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Groq => "groq",
            ProviderKind::OpenRouter => "openrouter",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude-sonnet-4-20250514",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Gemini => "gemini-2.0-flash-exp",
            ProviderKind::Groq => "meta-llama/llama-4-scout-17b-16e-instruct",
            ProviderKind::OpenRouter => "mistralai/mistral-large:free",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "groq" => Ok(ProviderKind::Groq),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => bail!(
                "unknown provider: {other}. Available: claude, openai, gemini, groq, openrouter"
            ),
        }
    }
}

fn api_key(kind: ProviderKind) -> Result<String> {
    std::env::var(kind.api_key_env()).with_context(|| {
        format!("{} is not set; export it to use the {kind} provider", kind.api_key_env())
    })
}

/// Build the configured provider, reading its API key from the environment
pub fn provider_for(kind: ProviderKind, model: Option<&str>) -> Result<Box<dyn Provider>> {
    let model = model.unwrap_or_else(|| kind.default_model()).to_string();
    let key = api_key(kind)?;

    Ok(match kind {
        ProviderKind::Claude => Box::new(claude::Claude::new(key, model)),
        ProviderKind::OpenAi => Box::new(openai::OpenAi::new(key, model)),
        ProviderKind::Gemini => Box::new(gemini::Gemini::new(key, model)),
        ProviderKind::Groq => Box::new(groq::Groq::new(key, model)),
        ProviderKind::OpenRouter => Box::new(openrouter::OpenRouter::new(key, model)),
    })
}

/// Extract a typed document from a PDF: derives the schema from `T`, calls the
/// provider, and validates the response into `T`.
pub async fn extract_document<T>(provider: &dyn Provider, pdf: &[u8], prompt: &str) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = serde_json::to_value(schemars::schema_for!(T)).context("serialize schema")?;
    let value = provider.extract_pdf(pdf, prompt, &schema).await?;
    serde_json::from_value(value).context("model response did not match the expected schema")
}

/// Run a completion from synchronous code.
///
/// The CLI uses #[tokio::main], so we're often already inside a runtime.
/// Creating a nested runtime and calling block_on would panic, hence:
/// - inside a runtime: block_in_place + Handle::block_on
/// - otherwise: spin up a runtime and block_on
pub fn complete_blocking(
    provider: &dyn Provider,
    system: &str,
    turns: &[ChatTurn],
) -> Result<String> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        tokio::task::block_in_place(|| handle.block_on(provider.complete(system, turns)))
    } else {
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        rt.block_on(provider.complete(system, turns))
    }
}

/// Parse a model's JSON answer, tolerating markdown code fences around it.
pub fn parse_model_json(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.strip_suffix("```").unwrap_or(s))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).context("parse model JSON response")
}

/// Prompt suffix instructing the model to answer in schema-shaped JSON.
/// Used by the providers that cannot enforce a schema server-side.
pub(crate) fn schema_instruction(prompt: &str, schema: &Value) -> String {
    format!("{prompt}\n\nRespond with ONLY valid JSON matching this schema:\n{schema}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" groq ".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert!("llamacpp".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_every_kind_has_model_and_key_env() {
        for kind in ProviderKind::ALL {
            assert!(!kind.default_model().is_empty());
            assert!(kind.api_key_env().ends_with("_API_KEY"));
        }
    }

    #[test]
    fn test_parse_model_json_plain() {
        let v = parse_model_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn test_parse_model_json_fenced() {
        let v = parse_model_json("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(v["a"], 1);

        let v = parse_model_json("```\n{\"b\": [1, 2]}\n```").unwrap();
        assert_eq!(v["b"][1], 2);
    }

    #[test]
    fn test_parse_model_json_rejects_prose() {
        assert!(parse_model_json("Sure! Here is the JSON you asked for.").is_err());
    }

    #[test]
    fn test_schema_instruction_embeds_schema() {
        let schema = serde_json::json!({"type": "object"});
        let out = schema_instruction("Extract the data.", &schema);
        assert!(out.starts_with("Extract the data."));
        assert!(out.contains("\"type\":\"object\""));
    }
}
