//! Command-line front end.
//!
//! Two modes share the same [`Orchestrator`]:
//! - single-shot: one prompt, JSON result on stdout
//! - interactive: a read loop with the control words `tools`, `models`,
//!   `quit`/`exit`/`q`
//!
//! Both are generic over their I/O so they can be driven from tests.

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::ProviderKeys;
use crate::llm::provider::{EXAMPLE_MODELS, describe_model};
use crate::llm::{OrchestrationResult, Orchestrator};

const RULE: &str = "============================================================";

/// Last line of an interactive session, however it ends.
pub const GOODBYE: &str = "Goodbye!";

/// Close an interactive session on `out`. Used on quit, end of input and Ctrl-C.
pub async fn say_goodbye<W>(out: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(format!("\n{GOODBYE}\n").as_bytes()).await?;
    out.flush().await
}

/// One line of interactive input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    Tools,
    Models,
    Empty,
    Prompt(String),
}

impl ReplCommand {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Self::Empty,
            "quit" | "exit" | "q" => Self::Quit,
            "tools" => Self::Tools,
            "models" => Self::Models,
            _ => Self::Prompt(trimmed.to_string()),
        }
    }
}

/// Run one request and print the result as pretty JSON.
///
/// Returns whether the request succeeded.
pub async fn run_single<W>(
    orchestrator: &Orchestrator,
    prompt: &str,
    model: &str,
    out: &mut W,
) -> anyhow::Result<bool>
where
    W: AsyncWrite + Unpin,
{
    let result = orchestrator.process_request(prompt, model).await;
    let json = serde_json::to_string_pretty(&result).context("serializing result")?;
    out.write_all(json.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(result.success)
}

/// Human-readable rendering of a result for the interactive loop.
#[must_use]
pub fn render_result(result: &OrchestrationResult) -> String {
    if !result.success {
        return format!(
            "Error: {}",
            result.error.as_deref().unwrap_or("Unknown error")
        );
    }

    let mut text = format!("Response: {}", result.response);
    if result.tool_calls_made > 0 {
        text.push_str(&format!("\n\nTools used: {}", result.tool_calls_made));
        for r in &result.tool_results {
            let status = if r.success { "ok" } else { "failed" };
            text.push_str(&format!("\n  - {} ({status})", r.tool));
        }
    }
    if result.total_tokens > 0 {
        text.push_str(&format!("\n\nTokens used: {}", result.total_tokens));
    }
    text
}

/// Interactive read loop.
pub struct Repl<'a, R, W> {
    orchestrator: &'a Orchestrator,
    default_model: &'a str,
    keys: &'a ProviderKeys,
    input: tokio::io::Lines<R>,
    out: W,
}

impl<R, W> std::fmt::Debug for Repl<'_, R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repl")
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl<'a, R, W> Repl<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        orchestrator: &'a Orchestrator,
        default_model: &'a str,
        keys: &'a ProviderKeys,
        input: R,
        out: W,
    ) -> Self {
        Self {
            orchestrator,
            default_model,
            keys,
            input: input.lines(),
            out,
        }
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    async fn say(&mut self, text: &str) -> anyhow::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.out.write_all(prompt.as_bytes()).await?;
        self.out.flush().await?;
        Ok(self.input.next_line().await?)
    }

    /// Read and answer lines until a quit command or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.say(&format!(
            "\n{RULE}\nLiteLLM MCP Agent - Interactive Mode\n{RULE}\n\
             Type 'quit', 'exit', or 'q' to exit\n\
             Type 'tools' to list available MCP tools\n\
             Type 'models' to see example supported models\n{}",
            "-".repeat(RULE.len())
        ))
        .await?;

        while let Some(line) = self.ask("\nEnter your request: ").await? {
            match ReplCommand::parse(&line) {
                ReplCommand::Quit => break,
                ReplCommand::Empty => {}
                ReplCommand::Tools => self.list_tools().await?,
                ReplCommand::Models => self.list_models().await?,
                ReplCommand::Prompt(prompt) => self.answer(&prompt).await?,
            }
        }

        say_goodbye(&mut self.out).await?;
        Ok(())
    }

    async fn list_tools(&mut self) -> anyhow::Result<()> {
        self.say("\nFetching available MCP tools...").await?;
        match self.orchestrator.tool_directory().await {
            Ok(directory) => {
                let mut text = format!("\nAvailable MCP tools ({}):", directory.len());
                for tool in directory.tools() {
                    text.push_str(&format!("\n  • {}: {}", tool.name, tool.description));
                }
                self.say(&text).await
            }
            Err(e) => self.say(&format!("Error fetching tools: {e}")).await,
        }
    }

    async fn list_models(&mut self) -> anyhow::Result<()> {
        let mut text = String::from("\nExample supported models:");
        for model in EXAMPLE_MODELS {
            text.push_str(&format!("\n  • {}", describe_model(model, self.keys)));
        }
        self.say(&text).await
    }

    async fn answer(&mut self, prompt: &str) -> anyhow::Result<()> {
        let default_model = self.default_model;
        let model = self
            .ask(&format!("Model (press Enter for {default_model}): "))
            .await?
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model.to_string());

        self.say(&format!("\nProcessing with {model}...\n{}", "-".repeat(40)))
            .await?;
        let result = self.orchestrator.process_request(prompt, &model).await;
        self.say(&render_result(&result)).await
    }
}
