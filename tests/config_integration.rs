use clap::Parser;
use litellm_mcp_agent::config::{AppConfig, Cli, DEFAULT_GATEWAY_URL, DEFAULT_MCP_URL, LogFormat};
use litellm_mcp_agent::error::ErrorKind;
use serial_test::serial;
use std::env;
use std::fs;

const VARS: &[&str] = &[
    "LITELLM_BASE_URL",
    "LITELLM_API_KEY",
    "MCP_SERVER_URL",
    "AGENT_MODEL",
    "AGENT_CONFIG",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "GEMINI_API_KEY",
    "AGENT_GATEWAY__TIMEOUT_SECS",
    "AGENT_AGENT__MAX_TOOL_ROUNDS",
];

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }
}

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["litellm-mcp-agent"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid command line")
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load(&parse(&[])).expect("defaults should load");
    assert_eq!(config.gateway.base_url, DEFAULT_GATEWAY_URL);
    assert_eq!(config.gateway.api_key, None);
    assert_eq!(config.gateway.timeout_secs, 60);
    assert_eq!(config.mcp.server_url, DEFAULT_MCP_URL);
    assert_eq!(config.mcp.timeout_secs, 30);
    assert_eq!(config.agent.default_model, "gpt-3.5-turbo");
    assert_eq!(config.agent.max_tool_rounds, 1);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.providers.openai_api_key.is_none());
}

#[test]
#[serial]
fn test_conventional_env_vars() {
    clear_env_vars();
    unsafe {
        env::set_var("LITELLM_BASE_URL", "http://gateway.internal:4000/");
        env::set_var("LITELLM_API_KEY", "sk-test");
        env::set_var("MCP_SERVER_URL", "http://tools.internal:8001/mcp");
        env::set_var("AGENT_MODEL", "claude-3-haiku-20240307");
        env::set_var("ANTHROPIC_API_KEY", "sk-ant");
        env::set_var("LOG_FORMAT", "JSON");
    }

    let config = AppConfig::load(&parse(&[])).expect("env config should load");
    assert_eq!(config.gateway.base_url, "http://gateway.internal:4000/");
    assert_eq!(config.gateway.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.mcp.server_url, "http://tools.internal:8001/mcp");
    assert_eq!(config.agent.default_model, "claude-3-haiku-20240307");
    assert_eq!(config.providers.anthropic_api_key.as_deref(), Some("sk-ant"));
    assert_eq!(config.logging.format, LogFormat::Json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_structured_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("AGENT_GATEWAY__TIMEOUT_SECS", "120");
        env::set_var("AGENT_AGENT__MAX_TOOL_ROUNDS", "3");
    }

    let config = AppConfig::load(&parse(&[])).expect("Failed to load config");
    assert_eq!(config.gateway.timeout_secs, 120);
    assert_eq!(config.agent.max_tool_rounds, 3);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("agent.yaml");
    fs::write(
        &file_path,
        r#"
gateway:
  base_url: "http://file-gateway:4000"
mcp:
  timeout_secs: 5
agent:
  default_model: "gpt-4"
"#,
    )
    .unwrap();

    let path = file_path.to_str().unwrap();
    let config = AppConfig::load(&parse(&["--config", path])).expect("file config should load");
    assert_eq!(config.gateway.base_url, "http://file-gateway:4000");
    assert_eq!(config.mcp.timeout_secs, 5);
    assert_eq!(config.mcp.server_url, DEFAULT_MCP_URL);
    assert_eq!(config.agent.default_model, "gpt-4");
}

#[test]
#[serial]
fn test_cli_flags_beat_env_and_file() {
    clear_env_vars();

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("agent.toml");
    fs::write(
        &file_path,
        "[agent]\ndefault_model = \"gpt-4\"\n\n[gateway]\nbase_url = \"http://file-gateway:4000\"\n",
    )
    .unwrap();

    unsafe {
        env::set_var("LITELLM_BASE_URL", "http://env-gateway:4000");
    }

    let path = file_path.to_str().unwrap();
    let config = AppConfig::load(&parse(&["-c", path, "-m", "gemini-pro"])).unwrap();
    assert_eq!(config.agent.default_model, "gemini-pro");
    assert_eq!(config.gateway.base_url, "http://env-gateway:4000");

    let config = AppConfig::load(&parse(&[
        "-c",
        path,
        "--gateway-url",
        "https://flag-gateway",
    ]))
    .unwrap();
    assert_eq!(config.gateway.base_url, "https://flag-gateway");
    assert_eq!(config.agent.default_model, "gpt-4");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_config_file_is_an_error() {
    clear_env_vars();

    let err = AppConfig::load(&parse(&["--config", "/nonexistent/agent.yaml"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    clear_env_vars();

    let err = AppConfig::load(&parse(&["--mcp-url", "ftp://tools"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("mcp.server_url"));

    let err = AppConfig::load(&parse(&["--max-tool-rounds", "0"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = AppConfig::load(&parse(&["--gateway-url", "localhost:4000 gateway"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
