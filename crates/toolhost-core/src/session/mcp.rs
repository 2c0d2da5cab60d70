//! Structured session using the official rmcp SDK
//!
//! Spawns the provider with rmcp's child-process transport; rmcp owns the
//! framing, the initialize handshake and request correlation.

use std::process::Stdio;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Content, Implementation, Tool},
    service::RunningService,
    transport::TokioChildProcess,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::log_event;
use crate::logging::{event, SharedEventLog};
use crate::types::{ProviderConfig, ToolDescriptor, ToolOutput, TransportKind};
use super::stderr::{self, StderrTail};
use super::{SessionOptions, SessionState, StartupError, ToolSession, TransportError, TransportResult};

/// Session backed by an rmcp client
pub struct StructuredSession {
    config: ProviderConfig,
    options: SessionOptions,
    log: SharedEventLog,
    client: Option<RunningService<RoleClient, ClientInfo>>,
    stderr_tail: StderrTail,
    stderr_task: Option<JoinHandle<()>>,
    state: SessionState,
}

impl StructuredSession {
    pub fn new(config: ProviderConfig, options: SessionOptions, log: SharedEventLog) -> Self {
        Self {
            config,
            options,
            log,
            client: None,
            stderr_tail: StderrTail::default(),
            stderr_task: None,
            state: SessionState::Configured,
        }
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: self.options.client_name.clone(),
                title: Some("Toolhost".to_string()),
                version: self.options.client_version.clone(),
                website_url: None,
                icons: None,
            },
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.command);
        command.args(&self.config.args).envs(&self.config.env);
        if let Some(cwd) = &self.config.cwd {
            command.current_dir(cwd);
        }
        command
    }

    async fn settle_stderr(&mut self) {
        if let Some(task) = self.stderr_task.take() {
            stderr::settle(task).await;
        }
    }

    fn client(&self) -> TransportResult<&RunningService<RoleClient, ClientInfo>> {
        self.client.as_ref().ok_or(TransportError::NotOnline)
    }
}

fn descriptor(tool: &Tool, session: &str) -> ToolDescriptor {
    let schema = serde_json::to_value(tool.input_schema.as_ref())
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    ToolDescriptor::new(
        tool.name.to_string(),
        tool.description.as_deref().unwrap_or_default(),
        schema,
        session,
    )
}

/// Turn typed content items into text segments
///
/// Text items contribute their text; any other item is kept as its JSON.
fn normalize(content: &[Content], is_error: Option<bool>) -> ToolOutput {
    let segments = content
        .iter()
        .map(|item| match item.as_text() {
            Some(text) => text.text.clone(),
            None => serde_json::to_string(item).unwrap_or_default(),
        })
        .collect();
    ToolOutput::from_segments(segments, is_error.unwrap_or(false))
}

#[async_trait]
impl ToolSession for StructuredSession {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn transport(&self) -> TransportKind {
        TransportKind::Structured
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn initialize(&mut self) -> Result<(), StartupError> {
        let name = self.config.name.clone();
        log_event!(
            self.log,
            event::INIT,
            "[{}] spawning {} {}",
            name,
            self.config.command,
            self.config.args.join(" ")
        );

        let (transport, stderr) = TokioChildProcess::builder(self.command())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| StartupError::Spawn {
                session: name.clone(),
                command: self.config.command.clone(),
                source,
            })?;
        self.stderr_task = stderr.map(|pipe| self.stderr_tail.drain(pipe, &name, self.log.clone()));

        let timeout = self.options.handshake_timeout;
        let outcome = tokio::time::timeout(timeout, self.client_info().serve(transport)).await;
        let client = match outcome {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => {
                self.settle_stderr().await;
                return Err(StartupError::Handshake {
                    session: name,
                    message: format!("{} (stderr: {})", e, self.stderr_tail.summary()),
                });
            }
            Err(_) => {
                self.settle_stderr().await;
                return Err(StartupError::HandshakeTimeout { session: name, timeout });
            }
        };

        let server = client
            .peer_info()
            .map(|info| info.server_info.name.clone())
            .unwrap_or_else(|| "unknown".to_string());
        log_event!(self.log, event::ONLINE, "[{}] structured session online (server: {})", name, server);

        self.client = Some(client);
        self.state = SessionState::Online;
        Ok(())
    }

    async fn list_tools(&self) -> TransportResult<Vec<ToolDescriptor>> {
        let client = self.client()?;
        let result = tokio::time::timeout(self.options.request_timeout, client.list_tools(Default::default()))
            .await
            .map_err(|_| TransportError::Timeout {
                method: "tools/list".to_string(),
                timeout: self.options.request_timeout,
            })?
            .map_err(|e| TransportError::Protocol(e.to_string()))?;

        Ok(result
            .tools
            .iter()
            .map(|tool| descriptor(tool, &self.config.name))
            .collect())
    }

    async fn call_tool(&self, name: &str, args: Value) -> TransportResult<ToolOutput> {
        let client = self.client()?;
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: args.as_object().cloned(),
            task: None,
        };

        let result = tokio::time::timeout(self.options.request_timeout, client.call_tool(params))
            .await
            .map_err(|_| TransportError::Timeout {
                method: "tools/call".to_string(),
                timeout: self.options.request_timeout,
            })?
            .map_err(|e| TransportError::Protocol(e.to_string()))?;

        Ok(normalize(&result.content, result.is_error))
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.state = SessionState::Closed;
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
        let Some(client) = self.client.take() else {
            return Ok(());
        };

        let reason = client
            .cancel()
            .await
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        log_event!(self.log, event::CLOSED, "[{}] structured session closed ({:?})", self.config.name, reason);
        Ok(())
    }
}
