mod common;

use std::sync::Arc;

use serde_json::json;
use toolhost_core::logging::{event, MemoryEventLog};
use toolhost_core::session::{RawSession, SessionState, StartupError, ToolSession, TransportError};

use common::{fast_options, Scripts, CRASHING_SERVER, ECHO_SERVER, GARBAGE_SERVER, SILENT_SERVER};

#[tokio::test]
async fn test_handshake_list_and_call() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut session = RawSession::new(scripts.provider("echo", "raw", ECHO_SERVER), fast_options(), log.clone());

    session.initialize().await.unwrap();
    assert_eq!(session.state(), SessionState::Online);
    assert!(log.messages(event::ONLINE)[0].contains("sh-echo"));

    let tools = session.list_tools().await.unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["echo", "slow"]);
    assert!(tools.iter().all(|t| t.session == "echo"));

    let output = session.call_tool("echo", json!({"text": "hi"})).await.unwrap();
    // ids: initialize=1, tools/list=2, this call=3
    assert_eq!(output.segments, vec!["call 3".to_string(), "done".to_string()]);

    session.close().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(session.list_tools().await, Err(TransportError::NotOnline)));
}

#[tokio::test]
async fn test_sequential_requests_match_send_order() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut session = RawSession::new(scripts.provider("echo", "raw", ECHO_SERVER), fast_options(), log.clone());
    session.initialize().await.unwrap();

    for expected in 2..7 {
        let output = session.call_tool("echo", json!({})).await.unwrap();
        assert_eq!(output.segments[0], format!("call {expected}"));
    }
    assert_eq!(log.count(event::WARNING), 0);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_timeout_keeps_later_calls_in_step() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut session = RawSession::new(scripts.provider("echo", "raw", ECHO_SERVER), fast_options(), log.clone());
    session.initialize().await.unwrap();

    let err = session.call_tool("slow", json!({})).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { ref method, .. } if method == "tools/call"));

    // the late answer to id 2 is skipped, not handed to id 3
    let output = session.call_tool("echo", json!({})).await.unwrap();
    assert_eq!(output.segments[0], "call 3");
    assert_eq!(log.count(event::WARNING), 0);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_reply_split_across_timeout_is_not_corrupted() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut session = RawSession::new(scripts.provider("echo", "raw", ECHO_SERVER), fast_options(), log.clone());
    session.initialize().await.unwrap();

    // half of the reply to id 2 arrives before the deadline, the rest after
    let err = session.call_tool("split", json!({})).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }));

    let output = session.call_tool("echo", json!({})).await.unwrap();
    assert_eq!(output.segments[0], "call 3");
    assert!(log
        .messages(event::DEBUG)
        .iter()
        .any(|m| m.contains("discarded late response id=2")));
    assert_eq!(log.count(event::WARNING), 0);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_rpc_error_is_transport_error() {
    let scripts = Scripts::new();
    let mut session = RawSession::new(
        scripts.provider("echo", "raw", ECHO_SERVER),
        fast_options(),
        Arc::new(MemoryEventLog::new()),
    );
    session.initialize().await.unwrap();

    match session.call_tool("fail", json!({})).await {
        Err(TransportError::Rpc { code, message }) => {
            assert_eq!(code, -32000);
            assert_eq!(message, "tool exploded");
        }
        other => panic!("unexpected: {:?}", other),
    }

    // the session is still usable afterwards
    assert!(session.call_tool("echo", json!({})).await.is_ok());
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_immediate_exit_reports_stderr() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut session = RawSession::new(scripts.provider("crashy", "raw", CRASHING_SERVER), fast_options(), log.clone());

    match session.initialize().await {
        Err(StartupError::Exited { session: name, code, stderr }) => {
            assert_eq!(name, "crashy");
            assert_eq!(code, Some(3));
            assert!(stderr.contains("ModuleNotFoundError"));
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Configured);
    assert_eq!(log.count(event::STDERR), 1);
}

#[tokio::test]
async fn test_silent_provider_times_out_handshake() {
    let scripts = Scripts::new();
    let mut session = RawSession::new(
        scripts.provider("silent", "raw", SILENT_SERVER),
        fast_options(),
        Arc::new(MemoryEventLog::new()),
    );

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, StartupError::HandshakeTimeout { .. }));
}

#[tokio::test]
async fn test_garbage_handshake_is_rejected() {
    let scripts = Scripts::new();
    let mut session = RawSession::new(
        scripts.provider("garbage", "raw", GARBAGE_SERVER),
        fast_options(),
        Arc::new(MemoryEventLog::new()),
    );

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, StartupError::Handshake { .. }));
}

#[tokio::test]
async fn test_spawn_failure() {
    let mut session = RawSession::new(
        toolhost_core::ProviderConfig::new("ghost", "/nonexistent/toolhost-provider").with_transport("raw"),
        fast_options(),
        Arc::new(MemoryEventLog::new()),
    );

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, StartupError::Spawn { .. }));
}
