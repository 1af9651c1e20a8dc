use std::time::Duration;

use anyhow::{Context, Result};

/// Environment access behind a trait so the loader can be tested with an
/// in-memory map instead of process globals.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Immutable process-wide configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: char,
    pub health_port: u16,
    pub api: ApiConfig,
}

/// Settings for the remote completion endpoint.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Absent key degrades the AI path to the apology reply; it never
    /// prevents the bot from starting.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_system_prompt() -> String {
    "あなたは親しみやすいDiscordボット「アイちゃん」です。\
     簡潔でフレンドリーな日本語で返答してください。"
        .to_string()
}

const DEFAULT_TIMEOUT_SECS: u64 = 12;
const DEFAULT_HEALTH_PORT: u16 = 3000;

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_source(&SystemEnv)
    }

    pub fn from_source(env: &dyn ReadEnv) -> Result<Self> {
        let discord_token = env.var("DISCORD_TOKEN").context("DISCORD_TOKEN not set")?;

        let command_prefix = env
            .var("COMMAND_PREFIX")
            .and_then(|s| s.chars().next())
            .unwrap_or('!');

        let health_port = match env.var("HEALTH_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("HEALTH_PORT is not a valid port: {}", raw))?,
            None => DEFAULT_HEALTH_PORT,
        };

        let timeout_secs = match env.var("COMPLETION_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("COMPLETION_TIMEOUT_SECS is not a number: {}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            discord_token,
            command_prefix,
            health_port,
            api: ApiConfig {
                api_key: env.var("OPENAI_API_KEY").filter(|k| !k.is_empty()),
                model: env.var("OPENAI_MODEL").unwrap_or_else(default_model),
                endpoint: env.var("OPENAI_ENDPOINT").unwrap_or_else(default_endpoint),
                system_prompt: env
                    .var("SYSTEM_PROMPT")
                    .unwrap_or_else(default_system_prompt),
                max_tokens: 512,
                temperature: 0.8,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}
