//! Raw session: line-delimited JSON-RPC over a child process's stdio
//!
//! Every request is one JSON document followed by `\n`. Exactly one line is
//! read back per request and responses are matched by send order; the `id`
//! field is only checked to skip answers to requests that already timed out.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::log_event;
use crate::logging::{event, SharedEventLog};
use crate::types::{ProviderConfig, ToolDescriptor, ToolOutput, TransportKind};
use super::stderr::{self, StderrTail};
use super::{SessionOptions, SessionState, StartupError, ToolSession, TransportError, TransportResult};

/// How long a provider that died during startup gets to report its exit code
const EXIT_WAIT: Duration = Duration::from_millis(200);

/// Pipes of a running provider
struct RawIo {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// Bytes of a response line not yet terminated; survives a timed-out read
    pending: Vec<u8>,
    stderr_task: Option<JoinHandle<()>>,
}

/// Session that frames JSON-RPC by hand
pub struct RawSession {
    config: ProviderConfig,
    options: SessionOptions,
    log: SharedEventLog,
    request_id: AtomicU64,
    /// Requests whose response never arrived in time
    stale: AtomicUsize,
    io: Mutex<Option<RawIo>>,
    stderr_tail: StderrTail,
    state: SessionState,
}

impl RawSession {
    pub fn new(config: ProviderConfig, options: SessionOptions, log: SharedEventLog) -> Self {
        Self {
            config,
            options,
            log,
            request_id: AtomicU64::new(1),
            stale: AtomicUsize::new(0),
            io: Mutex::new(None),
            stderr_tail: StderrTail::default(),
            state: SessionState::Configured,
        }
    }

    /// Last few lines the provider wrote to stderr
    pub fn stderr_tail(&self) -> String {
        self.stderr_tail.text()
    }

    fn spawn(&self) -> Result<RawIo, StartupError> {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.config.cwd {
            command.current_dir(cwd);
        }

        let spawn_error = |source: std::io::Error| StartupError::Spawn {
            session: self.config.name.clone(),
            command: self.config.command.clone(),
            source,
        };

        let mut child = command.spawn().map_err(spawn_error)?;
        let missing = |pipe: &str| spawn_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, format!("no {} pipe", pipe)));

        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| self.stderr_tail.drain(stderr, &self.config.name, self.log.clone()));

        Ok(RawIo {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            pending: Vec::new(),
            stderr_task,
        })
    }

    fn next_request(&self, method: &str, params: Value) -> (u64, Value) {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        (id, request)
    }

    async fn write_line(io: &mut RawIo, message: &Value) -> TransportResult<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;
        Ok(())
    }

    /// Read one complete response line
    ///
    /// `read_until` leaves partial input in `io.pending` when the read is
    /// cancelled, so a line split across a timeout is finished by the next read.
    async fn read_line(io: &mut RawIo) -> TransportResult<Value> {
        let bytes_read = io.stdout.read_until(b'\n', &mut io.pending).await?;
        if bytes_read == 0 {
            io.pending.clear();
            return Err(TransportError::Closed);
        }
        let raw = std::mem::take(&mut io.pending);
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim();
        serde_json::from_str(line).map_err(|e| TransportError::Malformed(format!("{}: {}", e, line)))
    }

    /// Write one request and read its response line
    ///
    /// Lines answering earlier, timed-out requests are discarded first.
    async fn exchange(&self, io: &mut RawIo, id: u64, request: &Value) -> TransportResult<Value> {
        Self::write_line(io, request).await?;

        loop {
            let response = Self::read_line(io).await?;
            let response_id = response.get("id").and_then(Value::as_u64);

            match response_id {
                Some(rid) if rid == id => return Ok(response),
                Some(rid) if rid < id && self.stale.load(Ordering::SeqCst) > 0 => {
                    self.stale.fetch_sub(1, Ordering::SeqCst);
                    log_event!(self.log, event::DEBUG, "[{}] discarded late response id={}", self.config.name, rid);
                }
                other => {
                    log_event!(
                        self.log,
                        event::WARNING,
                        "[{}] response id {:?} does not match request id {}; accepting by send order",
                        self.config.name,
                        other,
                        id
                    );
                    return Ok(response);
                }
            }
        }
    }

    /// Send a request and return its `result`, bounded by the request timeout
    async fn request(&self, method: &str, params: Value) -> TransportResult<Value> {
        let mut guard = self.io.lock().await;
        let io = guard.as_mut().ok_or(TransportError::NotOnline)?;

        let (id, request) = self.next_request(method, params);
        log_event!(self.log, event::DEBUG, "[{}] -> {} id={}", self.config.name, method, id);

        let timeout = self.options.request_timeout;
        let response = match tokio::time::timeout(timeout, self.exchange(io, id, &request)).await {
            Ok(response) => response?,
            Err(_) => {
                self.stale.fetch_add(1, Ordering::SeqCst);
                return Err(TransportError::Timeout {
                    method: method.to_string(),
                    timeout,
                });
            }
        };

        parse_response(response)
    }

    /// Collect what is known about a provider that died during startup
    async fn startup_exit(&self, mut io: RawIo) -> StartupError {
        let code = match tokio::time::timeout(EXIT_WAIT, io.child.wait()).await {
            Ok(Ok(status)) => status.code(),
            _ => {
                let _ = io.child.kill().await;
                None
            }
        };
        if let Some(task) = io.stderr_task.take() {
            stderr::settle(task).await;
        }
        StartupError::Exited {
            session: self.config.name.clone(),
            code,
            stderr: self.stderr_tail.summary(),
        }
    }

    async fn handshake(&self, io: &mut RawIo) -> TransportResult<Value> {
        let (id, request) = self.next_request(
            "initialize",
            json!({
                "protocolVersion": self.options.protocol_version,
                "capabilities": {},
                "clientInfo": {
                    "name": self.options.client_name,
                    "version": self.options.client_version,
                },
            }),
        );
        let response = self.exchange(io, id, &request).await?;
        let result = parse_response(response)?;

        Self::write_line(io, &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })).await?;
        Ok(result)
    }
}

/// Split a JSON-RPC response into its result or error
fn parse_response(response: Value) -> TransportResult<Value> {
    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(TransportError::Rpc { code, message });
    }

    response
        .get("result")
        .cloned()
        .ok_or_else(|| TransportError::Malformed("Missing result field".to_string()))
}

/// Read `result.tools` from a `tools/list` response
fn parse_tools(result: &Value, session: &str) -> TransportResult<Vec<ToolDescriptor>> {
    let tools = result
        .get("tools")
        .and_then(Value::as_array)
        .ok_or_else(|| TransportError::Malformed("tools/list result has no tools array".to_string()))?;

    tools
        .iter()
        .map(|tool| {
            let name = tool
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| TransportError::Malformed("tool without a name".to_string()))?;
            let description = tool.get("description").and_then(Value::as_str).unwrap_or_default();
            let schema = tool
                .get("inputSchema")
                .cloned()
                .unwrap_or_else(|| json!({ "type": "object" }));
            Ok(ToolDescriptor::new(name, description, schema, session))
        })
        .collect()
}

/// Turn bare `result.content` items into text segments
///
/// Text items contribute their text; any other item is kept as its JSON.
fn parse_tool_output(result: &Value) -> ToolOutput {
    let segments = result
        .get("content")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match (item.get("type").and_then(Value::as_str), item.get("text")) {
                    (Some("text"), Some(Value::String(text))) => text.clone(),
                    _ => item.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    let is_error = result.get("isError").and_then(Value::as_bool).unwrap_or(false);

    ToolOutput::from_segments(segments, is_error)
}

#[async_trait]
impl ToolSession for RawSession {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn transport(&self) -> TransportKind {
        TransportKind::Raw
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

        let mut io = self.spawn()?;

        if !self.options.warmup.is_zero() {
            tokio::time::sleep(self.options.warmup).await;
        }
        if let Ok(Some(_)) = io.child.try_wait() {
            return Err(self.startup_exit(io).await);
        }

        let timeout = self.options.handshake_timeout;
        let outcome = tokio::time::timeout(timeout, self.handshake(&mut io)).await;
        match outcome {
            Ok(Ok(result)) => {
                let server = result
                    .pointer("/serverInfo/name")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                log_event!(self.log, event::ONLINE, "[{}] raw session online (server: {})", name, server);
            }
            Ok(Err(TransportError::Rpc { code, message })) => {
                let _ = io.child.kill().await;
                return Err(StartupError::Handshake {
                    session: name,
                    message: format!("initialize rejected ({}): {}", code, message),
                });
            }
            Ok(Err(TransportError::Malformed(message))) => {
                let _ = io.child.kill().await;
                return Err(StartupError::Handshake { session: name, message });
            }
            Ok(Err(_)) => return Err(self.startup_exit(io).await),
            Err(_) => {
                let _ = io.child.kill().await;
                return Err(StartupError::HandshakeTimeout { session: name, timeout });
            }
        }

        *self.io.get_mut() = Some(io);
        self.state = SessionState::Online;
        Ok(())
    }

    async fn list_tools(&self) -> TransportResult<Vec<ToolDescriptor>> {
        let result = self.request("tools/list", json!({})).await?;
        parse_tools(&result, &self.config.name)
    }

    async fn call_tool(&self, name: &str, args: Value) -> TransportResult<ToolOutput> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": args }))
            .await?;
        Ok(parse_tool_output(&result))
    }

    async fn close(&mut self) -> TransportResult<()> {
        let Some(mut io) = self.io.get_mut().take() else {
            self.state = SessionState::Closed;
            return Ok(());
        };

        drop(io.stdin);
        let code = match tokio::time::timeout(self.options.shutdown_grace, io.child.wait()).await {
            Ok(status) => status?.code(),
            Err(_) => {
                log_event!(self.log, event::WARNING, "[{}] did not exit after stdin closed; killing", self.config.name);
                io.child.kill().await?;
                None
            }
        };
        if let Some(task) = io.stderr_task.take() {
            task.abort();
        }

        self.state = SessionState::Closed;
        log_event!(self.log, event::CLOSED, "[{}] raw session closed (exit code {:?})", self.config.name, code);
        Ok(())
    }
}
