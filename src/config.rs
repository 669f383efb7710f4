use crate::error::{AgentError, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:4000";
pub const DEFAULT_MCP_URL: &str = "http://localhost:8001/mcp";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const EXAMPLES: &str = "\
Examples:
  litellm-mcp-agent                                     # Interactive mode
  litellm-mcp-agent -p \"What files are in my directory?\" -m gpt-4
  litellm-mcp-agent --prompt \"Analyze this data\" --model claude-3-sonnet-20240229";

#[derive(Parser, Debug, Clone, Default)]
#[command(
    author,
    version,
    about = "LiteLLM MCP Agent - AI assistant with MCP tools",
    long_about = None,
    after_help = EXAMPLES
)]
pub struct Cli {
    /// Single prompt to process (non-interactive mode)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Model to use (default: gpt-3.5-turbo)
    #[arg(short, long, env = "AGENT_MODEL")]
    pub model: Option<String>,

    /// MCP server URL
    #[arg(long, env = "MCP_SERVER_URL")]
    pub mcp_url: Option<String>,

    /// LiteLLM gateway base URL
    #[arg(long, env = "LITELLM_BASE_URL")]
    pub gateway_url: Option<String>,

    /// LiteLLM gateway API key
    #[arg(long, env = "LITELLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Config file path (YAML, TOML or JSON)
    #[arg(short, long, env = "AGENT_CONFIG")]
    pub config: Option<String>,

    /// Log level or filter directive (e.g. "debug", "litellm_mcp_agent=trace")
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format: pretty or json
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Gateway rounds that may offer tools before the final answer
    #[arg(long)]
    pub max_tool_rounds: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub gateway: GatewaySettings,
    pub mcp: McpSettings,
    pub agent: AgentSettings,
    #[serde(default)]
    pub providers: ProviderKeys,
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct McpSettings {
    pub server_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentSettings {
    pub default_model: String,
    pub max_tool_rounds: u32,
}

/// Direct provider keys. The agent always goes through the gateway; these are
/// only reported by the `models` command.
#[derive(Deserialize, Clone, Default)]
pub struct ProviderKeys {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
}

impl std::fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProviderKeys")
            .field("openai_api_key", &set(&self.openai_api_key))
            .field("anthropic_api_key", &set(&self.anthropic_api_key))
            .field("gemini_api_key", &set(&self.gemini_api_key))
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl AppConfig {
    /// Build the configuration for a parsed command line.
    ///
    /// Priority: CLI flag > CLI env var > `AGENT_*` env > config file > defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("gateway.base_url", DEFAULT_GATEWAY_URL)?
            .set_default("gateway.timeout_secs", 60)?
            .set_default("mcp.server_url", DEFAULT_MCP_URL)?
            .set_default("mcp.timeout_secs", 30)?
            .set_default("agent.default_model", DEFAULT_MODEL)?
            .set_default("agent.max_tool_rounds", 1)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        // 2. Config file
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 3. Structured environment, e.g. AGENT_GATEWAY__TIMEOUT_SECS=120
        builder = builder.add_source(
            Environment::with_prefix("AGENT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. Per-provider keys under their conventional names
        for (key, var) in [
            ("providers.openai_api_key", "OPENAI_API_KEY"),
            ("providers.anthropic_api_key", "ANTHROPIC_API_KEY"),
            ("providers.gemini_api_key", "GEMINI_API_KEY"),
        ] {
            if let Ok(val) = env::var(var) {
                if !val.trim().is_empty() {
                    builder = builder.set_override(key, val)?;
                }
            }
        }

        // 5. CLI overrides (clap already folded in LITELLM_BASE_URL and friends)
        if let Some(url) = &cli.gateway_url {
            builder = builder.set_override("gateway.base_url", url.as_str())?;
        }
        if let Some(key) = &cli.api_key {
            builder = builder.set_override("gateway.api_key", key.as_str())?;
        }
        if let Some(url) = &cli.mcp_url {
            builder = builder.set_override("mcp.server_url", url.as_str())?;
        }
        if let Some(model) = &cli.model {
            builder = builder.set_override("agent.default_model", model.as_str())?;
        }
        if let Some(rounds) = cli.max_tool_rounds {
            builder = builder.set_override("agent.max_tool_rounds", i64::from(rounds))?;
        }
        if let Some(level) = &cli.log_level {
            builder = builder.set_override("logging.level", level.as_str())?;
        }
        if let Some(format) = &cli.log_format {
            builder = builder.set_override("logging.format", format.to_lowercase())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        check_http_url("gateway.base_url", &self.gateway.base_url)?;
        check_http_url("mcp.server_url", &self.mcp.server_url)?;

        if self.gateway.timeout_secs == 0 || self.mcp.timeout_secs == 0 {
            return Err(AgentError::Config("timeouts must be at least 1 second".to_string()));
        }
        if self.agent.max_tool_rounds == 0 {
            return Err(AgentError::Config(
                "agent.max_tool_rounds must be at least 1".to_string(),
            ));
        }
        if self.agent.default_model.trim().is_empty() {
            return Err(AgentError::Config("agent.default_model cannot be empty".to_string()));
        }
        Ok(())
    }
}

fn check_http_url(key: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value)
        .map_err(|e| AgentError::Config(format!("{key} is not a valid URL ({value}): {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AgentError::Config(format!(
            "{key} must use http or https, got {other}"
        ))),
    }
}
