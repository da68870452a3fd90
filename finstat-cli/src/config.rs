use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub chat: ChatSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    /// "anthropic" or "openai"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Falls back to ANTHROPIC_API_KEY / OPENAI_API_KEY when absent.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSection {
    #[serde(default = "default_max_turns")]
    pub max_turns_context: usize,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_turns() -> usize {
    10
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
        }
    }
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            max_turns_context: default_max_turns(),
        }
    }
}

pub fn finstat_home() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME not set")?;
    let dir = PathBuf::from(home).join(".finstat");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(finstat_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: Config = toml::from_str("[llm]\nprovider = \"anthropic\"\n").unwrap();
        assert_eq!(cfg.llm.provider, "anthropic");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.chat.max_turns_context, 10);
    }

    #[test]
    fn test_empty_config_is_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert!(cfg.llm.api_key.is_none());
    }
}
