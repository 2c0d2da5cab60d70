//! toolhost binary entry point.

mod cli;

use std::future::Future;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use toolhost_core::config::{ConfigFile, ConfigProvider, FileConfigProvider};
use toolhost_core::model::DEFAULT_MODEL;
use toolhost_core::{
    event, log_event, ConsoleEventLog, FanoutEventLog, GenaiModel, JsonlEventLog, ModelClient, Orchestrator,
    SessionHost, SessionOptions, SharedEventLog, ToolDispatcher, ToolRouter, TurnOptions,
};

use cli::Cli;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv(); // load .env if present, ignore error
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build_log(cli: &Cli) -> Result<SharedEventLog, Box<dyn std::error::Error>> {
    let file: SharedEventLog = Arc::new(JsonlEventLog::open(&cli.log_file)?);
    if cli.verbose {
        Ok(Arc::new(FanoutEventLog::new(vec![file, Arc::new(ConsoleEventLog::new())])))
    } else {
        Ok(file)
    }
}

async fn load_config(cli: &Cli) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let provider = match &cli.config {
        Some(path) => FileConfigProvider::new(path),
        None => FileConfigProvider::discover(),
    };
    Ok(provider.load().await?)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let log = build_log(&cli)?;
    let config = load_config(&cli).await?;

    let mut turn_options = TurnOptions::from(&config.chat);
    if let Some(system) = &cli.system {
        turn_options.system = system.clone();
    }
    turn_options.chain_tools |= cli.chain_tools;

    let model_name = cli
        .model
        .clone()
        .or_else(|| config.chat.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let mut model = GenaiModel::new(&model_name, log.clone());
    if let Some(key) = &cli.api_key {
        model = model.with_api_key(key);
    }

    if !cli.skip_check {
        model
            .check_connection()
            .await
            .map_err(|e| format!("could not reach model {model_name}: {e}"))?;
    }

    let mut host = SessionHost::new(
        config.servers.clone(),
        SessionOptions::from(&config.session),
        log.clone(),
    );
    let failures = host.start_all().await;
    for failure in &failures {
        eprintln!("[!] {failure}");
    }
    let tool_count = host.expose_tools().await.len();
    eprintln!(
        "{} server(s) online, {} tool(s) available, model {}",
        host.session_names().len(),
        tool_count,
        model_name
    );

    let router = ToolRouter::new(&host, config.chat.route_mode, log.clone());
    let mut orchestrator = Orchestrator::new(Arc::new(model), turn_options, log.clone());
    let stdin = BufReader::new(tokio::io::stdin());
    let result = chat_loop(&mut orchestrator, &router, stdin, tokio::signal::ctrl_c(), &log).await;

    host.stop_all().await;
    result?;
    Ok(())
}

/// Why the chat loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    EndOfInput,
    Quit,
    Interrupted,
}

/// Read lines, run one turn per line, until EOF, `exit`/`quit` or `interrupt` resolves
///
/// `interrupt` is polled both while waiting for input and while a turn runs.
async fn chat_loop<R, I>(
    orchestrator: &mut Orchestrator,
    tools: &dyn ToolDispatcher,
    input: R,
    interrupt: I,
    log: &SharedEventLog,
) -> std::io::Result<LoopExit>
where
    R: AsyncBufRead + Unpin,
    I: Future,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        eprint!("> ");
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut interrupt => {
                log_event!(log, event::OFFLINE, "interrupted, shutting down");
                eprintln!();
                return Ok(LoopExit::Interrupted);
            }
        };

        let Some(line) = line else {
            return Ok(LoopExit::EndOfInput);
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            return Ok(LoopExit::Quit);
        }

        tokio::select! {
            result = orchestrator.run_turn(tools, input) => match result {
                Ok(answer) => println!("{answer}"),
                Err(e) => eprintln!("[!] {e}"),
            },
            _ = &mut interrupt => {
                log_event!(log, event::OFFLINE, "interrupted during a turn, shutting down");
                eprintln!();
                return Ok(LoopExit::Interrupted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;
    use toolhost_core::{
        MemoryEventLog, Message, ModelRequest, ScriptedModel, Tool, ToolError, ToolOutput,
    };
    use toolhost_core::model::ModelResult;

    use super::*;

    struct NoTools;

    #[async_trait]
    impl ToolDispatcher for NoTools {
        fn advertised_tools(&self) -> Vec<Tool> {
            Vec::new()
        }

        async fn call(&self, _name: &str, _args: &Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::default())
        }
    }

    /// Model that never answers
    struct StalledModel;

    #[async_trait]
    impl ModelClient for StalledModel {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _request: ModelRequest) -> ModelResult<Message> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_loop_ends_on_quit() {
        let log: SharedEventLog = Arc::new(MemoryEventLog::new());
        let mut orchestrator = Orchestrator::new(Arc::new(ScriptedModel::new()), TurnOptions::default(), log.clone());

        let exit = chat_loop(&mut orchestrator, &NoTools, &b"hello\nquit\nnever\n"[..], std::future::pending::<()>(), &log)
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(orchestrator.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_loop_ends_at_end_of_input() {
        let log: SharedEventLog = Arc::new(MemoryEventLog::new());
        let mut orchestrator = Orchestrator::new(Arc::new(ScriptedModel::new()), TurnOptions::default(), log.clone());

        let exit = chat_loop(&mut orchestrator, &NoTools, &b"\n"[..], std::future::pending::<()>(), &log)
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::EndOfInput);
        assert!(orchestrator.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_during_turn_ends_loop() {
        let memory = Arc::new(MemoryEventLog::new());
        let log: SharedEventLog = memory.clone();
        let mut orchestrator = Orchestrator::new(Arc::new(StalledModel), TurnOptions::default(), log.clone());

        let interrupt = tokio::time::sleep(Duration::from_millis(50));
        let exit = chat_loop(&mut orchestrator, &NoTools, &b"slow question\n"[..], interrupt, &log)
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::Interrupted);
        assert!(orchestrator.conversation().is_empty());
        assert!(memory.messages(event::OFFLINE)[0].contains("during a turn"));
    }
}
