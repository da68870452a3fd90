use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Resolve an LLM config from ~/.finstat/config.toml, falling back to env
/// keys. `None` means no provider is configured and chat should answer from
/// the deterministic templates.
pub fn default_config() -> Result<Option<LlmConfig>> {
    let cfg = config::load_config()?;

    let (provider, env_key) = match cfg.llm.provider.as_str() {
        "anthropic" => (Provider::Anthropic, "ANTHROPIC_API_KEY"),
        _ => (Provider::OpenAI, "OPENAI_API_KEY"),
    };

    let api_key = cfg
        .llm
        .api_key
        .or_else(|| std::env::var(env_key).ok())
        .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());

    let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
        return Ok(None);
    };

    Ok(Some(LlmConfig {
        provider,
        model: cfg.llm.model,
        api_key,
    }))
}

pub async fn chat_complete(config: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    match config.provider {
        Provider::Anthropic => anthropic_complete(config, system, turns).await,
        Provider::OpenAI => openai_complete(config, system, turns).await,
    }
}

async fn anthropic_complete(config: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    #[derive(Serialize)]
    struct Req<'a> {
        model: &'a str,
        max_tokens: i32,
        system: &'a str,
        messages: &'a [ChatTurn],
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

    let body = Req {
        model: &config.model,
        max_tokens: 1000,
        system,
        messages: turns,
    };

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_str(&config.api_key)?);
    headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let resp = client
        .post("https://api.anthropic.com/v1/messages")
        .headers(headers)
        .json(&body)
        .send()
        .await
        .context("anthropic request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("anthropic error: {status} {txt}");
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

async fn openai_complete(config: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    #[derive(Serialize)]
    struct Req {
        model: String,
        messages: Vec<ChatTurn>,
        temperature: f32,
    }

    #[derive(Deserialize)]
    struct Resp {
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

    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatTurn {
        role: "system".to_string(),
        content: system.to_string(),
    });
    messages.extend(turns.iter().cloned());

    let body = Req {
        model: config.model.clone(),
        messages,
        temperature: 0.4,
    };

    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .header(AUTHORIZATION, format!("Bearer {}", config.api_key))
        .json(&body)
        .send()
        .await
        .context("openai request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("openai error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse openai response")?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    Ok(content.trim().to_string())
}
