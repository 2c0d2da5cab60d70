//! Shell-script tool providers speaking line-delimited JSON-RPC

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use toolhost_core::{ProviderConfig, SessionOptions};

/// Answers initialize, tools/list and tools/call.
///
/// `echo` replies with the request id, `slow` sleeps a second first,
/// `split` writes half a line then the rest a second later, and `fail`
/// returns a JSON-RPC error.
pub const ECHO_SERVER: &str = r#"
while IFS= read -r line; do
  id=$(printf '%s\n' "$line" | sed -n 's/.*"id":\([0-9][0-9]*\).*/\1/p')
  case "$line" in
    *'"method":"initialize"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"protocolVersion":"2024-11-05","capabilities":{"tools":{}},"serverInfo":{"name":"sh-echo","version":"0.1.0"}}}\n' "$id" ;;
    *'"method":"tools/list"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"tools":[{"name":"echo","description":"Echo the request id","inputSchema":{"type":"object"}},{"name":"slow","description":"Answer after a second","inputSchema":{"type":"object"}}]}}\n' "$id" ;;
    *'"name":"slow"'*)
      sleep 1
      printf '{"jsonrpc":"2.0","id":%s,"result":{"content":[{"type":"text","text":"slow %s"}]}}\n' "$id" "$id" ;;
    *'"name":"split"'*)
      printf '{"jsonrpc":"2.0","id":%s,"res' "$id"
      sleep 1
      printf 'ult":{"content":[{"type":"text","text":"split %s"}]}}\n' "$id" ;;
    *'"name":"fail"'*)
      printf '{"jsonrpc":"2.0","id":%s,"error":{"code":-32000,"message":"tool exploded"}}\n' "$id" ;;
    *'"method":"tools/call"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"content":[{"type":"text","text":"call %s"},{"type":"text","text":"done"}]}}\n' "$id" "$id" ;;
  esac
done
"#;

/// Dies before answering anything
pub const CRASHING_SERVER: &str = r#"
echo "ModuleNotFoundError: No module named 'mcp'" >&2
exit 3
"#;

/// Reads requests but never answers
pub const SILENT_SERVER: &str = r#"
while IFS= read -r line; do :; done
"#;

/// Answers with something that is not JSON
pub const GARBAGE_SERVER: &str = r#"
while IFS= read -r line; do echo "hello there"; done
"#;

pub struct Scripts {
    dir: TempDir,
}

impl Scripts {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write a script and return a provider config running it with `sh`
    pub fn provider(&self, name: &str, transport: &str, body: &str) -> ProviderConfig {
        let path: PathBuf = self.dir.path().join(format!("{name}.sh"));
        std::fs::write(&path, body).unwrap();
        ProviderConfig::new(name, "sh")
            .with_transport(transport)
            .with_args([path.to_string_lossy().to_string()])
    }
}

pub fn fast_options() -> SessionOptions {
    SessionOptions {
        request_timeout: Duration::from_millis(700),
        handshake_timeout: Duration::from_secs(2),
        shutdown_grace: Duration::from_millis(500),
        ..SessionOptions::default()
    }
}
