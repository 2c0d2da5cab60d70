//! CLI argument definitions for toolhost.

use std::path::PathBuf;

use clap::Parser;

/// Chat with a model that can call tools from local MCP servers
#[derive(Parser, Debug)]
#[command(name = "toolhost", version, about = "Tool-calling chat over MCP servers")]
pub struct Cli {
    /// Host config file (JSON or YAML); defaults to ./host_config.json
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model to use (e.g. claude-3-5-haiku-latest or openai/gpt-4o)
    #[arg(short, long, env = "ANTHROPIC_MODEL")]
    pub model: Option<String>,

    /// API key for the model provider; without it the provider's usual env var is used
    #[arg(long, env = "TOOLHOST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Skip the startup request that checks the model is reachable
    #[arg(long)]
    pub skip_check: bool,

    /// System prompt, overriding the config file
    #[arg(short, long)]
    pub system: Option<String>,

    /// JSON-lines event log
    #[arg(long, value_name = "PATH", default_value = toolhost_core::logging::DEFAULT_LOG_PATH)]
    pub log_file: PathBuf,

    /// Let the model chain tool calls within one turn
    #[arg(long)]
    pub chain_tools: bool,

    /// Mirror events to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
