//! Provider detection and the example model catalog.
//!
//! Every request goes through the gateway, which routes by model identifier.
//! This module only maps model identifiers to the upstream provider so the CLI
//! can show which direct provider keys are configured.

use crate::config::ProviderKeys;

/// Upstream providers the gateway commonly routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// `OpenAI` (gpt-*, o1/o3 families)
    OpenAI,
    /// Anthropic (claude-*)
    Anthropic,
    /// Google (gemini-*)
    Google,
    /// Local Ollama models (ollama/*)
    Ollama,
    /// Anything else the gateway knows about
    Generic,
}

/// Example models listed by the `models` command.
pub const EXAMPLE_MODELS: &[&str] = &[
    "gpt-3.5-turbo",
    "gpt-4",
    "gpt-4-turbo",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
    "gemini-pro",
    "ollama/llama2",
];

impl Provider {
    /// Detect provider from a model identifier.
    ///
    /// # Example
    ///
    /// ```rust
    /// use litellm_mcp_agent::llm::Provider;
    ///
    /// assert_eq!(Provider::detect_from_model("claude-3-haiku-20240307"), Provider::Anthropic);
    /// ```
    #[must_use]
    pub fn detect_from_model(model: &str) -> Self {
        let lower = model.to_lowercase();
        // Gateway-style "provider/model" prefixes win over name patterns.
        let (prefix, name) = lower.split_once('/').unwrap_or(("", lower.as_str()));

        match prefix {
            "openai" => return Self::OpenAI,
            "anthropic" => return Self::Anthropic,
            "gemini" | "vertex_ai" => return Self::Google,
            "ollama" | "ollama_chat" => return Self::Ollama,
            _ => {}
        }

        if name.starts_with("gpt-") || name.starts_with("o1") || name.starts_with("o3") {
            Self::OpenAI
        } else if name.starts_with("claude") {
            Self::Anthropic
        } else if name.starts_with("gemini") {
            Self::Google
        } else {
            Self::Generic
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Google => "Google",
            Self::Ollama => "Ollama",
            Self::Generic => "gateway",
        }
    }

    /// Environment variable holding this provider's direct API key, if any.
    #[must_use]
    pub fn key_env_var(self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Google => Some("GEMINI_API_KEY"),
            Self::Ollama | Self::Generic => None,
        }
    }

    /// Whether a direct key for this provider is present in `keys`.
    #[must_use]
    pub fn has_direct_key(self, keys: &ProviderKeys) -> bool {
        let key = match self {
            Self::OpenAI => keys.openai_api_key.as_deref(),
            Self::Anthropic => keys.anthropic_api_key.as_deref(),
            Self::Google => keys.gemini_api_key.as_deref(),
            Self::Ollama | Self::Generic => None,
        };
        key.is_some_and(|k| !k.trim().is_empty())
    }
}

/// One line of the `models` listing.
#[must_use]
pub fn describe_model(model: &str, keys: &ProviderKeys) -> String {
    let provider = Provider::detect_from_model(model);
    let mut line = format!("{model} ({})", provider.display_name());
    if provider == Provider::Ollama {
        line.push_str(" - requires a running Ollama instance");
    } else if provider.has_direct_key(keys) {
        line.push_str(" - direct key configured");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_openai() {
        assert_eq!(Provider::detect_from_model("gpt-3.5-turbo"), Provider::OpenAI);
        assert_eq!(Provider::detect_from_model("openai/gpt-4o"), Provider::OpenAI);
    }

    #[test]
    fn test_detect_anthropic() {
        let provider = Provider::detect_from_model("claude-3-sonnet-20240229");
        assert_eq!(provider, Provider::Anthropic);
        assert_eq!(provider.key_env_var(), Some("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_detect_google_and_ollama() {
        assert_eq!(Provider::detect_from_model("gemini-pro"), Provider::Google);
        assert_eq!(Provider::detect_from_model("ollama/llama2"), Provider::Ollama);
        assert_eq!(Provider::detect_from_model("mistral-large"), Provider::Generic);
    }

    #[test]
    fn test_describe_model() {
        let keys = ProviderKeys {
            openai_api_key: Some("sk-test".to_string()),
            anthropic_api_key: Some("  ".to_string()),
            gemini_api_key: None,
        };
        assert_eq!(
            describe_model("gpt-4", &keys),
            "gpt-4 (OpenAI) - direct key configured"
        );
        assert_eq!(
            describe_model("claude-3-haiku-20240307", &keys),
            "claude-3-haiku-20240307 (Anthropic)"
        );
        assert!(describe_model("ollama/llama2", &keys).contains("Ollama instance"));
    }
}
