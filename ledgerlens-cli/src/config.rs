use anyhow::{Context, Result};
use ledgerlens_providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_ledgerlens_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderSection,
    pub chat: ChatSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSection {
    /// claude | openai | gemini | groq | openrouter
    pub name: String,
    /// Model override; None uses the provider default
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSection {
    pub max_turns_context: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderSection {
                name: "claude".to_string(),
                model: None,
            },
            chat: ChatSection {
                max_turns_context: 12,
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_ledgerlens_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// Pick the provider: --provider flag, then AI_PROVIDER env, then config file.
pub fn resolve_provider(flag: Option<&str>, cfg: &Config) -> Result<ProviderKind> {
    if let Some(name) = flag {
        return name.parse();
    }
    if let Ok(name) = std::env::var("AI_PROVIDER") {
        return name.parse();
    }
    cfg.provider.name.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_as_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.provider.name, "claude");
        assert_eq!(back.provider.model, None);
        assert_eq!(back.chat.max_turns_context, 12);
    }

    #[test]
    fn test_resolve_provider_prefers_flag() {
        let cfg = Config::default();
        let kind = resolve_provider(Some("groq"), &cfg).unwrap();
        assert_eq!(kind, ProviderKind::Groq);
    }

    #[test]
    fn test_resolve_provider_rejects_unknown() {
        let cfg = Config::default();
        assert!(resolve_provider(Some("not-a-provider"), &cfg).is_err());
    }
}
