mod common;

use std::sync::Arc;

use serde_json::json;
use toolhost_core::logging::{event, MemoryEventLog};
use toolhost_core::{
    Message, Orchestrator, ProviderConfig, RouteMode, ScriptedModel, SessionHost, StartupError,
    ToolDispatcher, ToolError, ToolRouter, TurnOptions,
};

use common::{fast_options, Scripts, CRASHING_SERVER, ECHO_SERVER};

#[tokio::test]
async fn test_crashing_provider_does_not_block_others() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut host = SessionHost::new(
        vec![
            scripts.provider("first", "raw", ECHO_SERVER),
            scripts.provider("crashy", "raw", CRASHING_SERVER),
            ProviderConfig::new("ghost", "/nonexistent/toolhost-provider").with_transport("raw"),
            scripts.provider("second", "raw", ECHO_SERVER),
        ],
        fast_options(),
        log.clone(),
    );

    let failures = host.start_all().await;

    assert_eq!(host.session_names(), vec!["first", "second"]);
    assert_eq!(failures.len(), 2);
    assert!(failures
        .iter()
        .any(|f| matches!(f, StartupError::Exited { session, .. } if session == "crashy")));
    assert_eq!(log.count(event::ERROR), 2);

    let catalog = host.expose_tools().await;
    assert_eq!(catalog.len(), 4);
    assert_eq!(host.advertised_tools().len(), 2);

    host.stop_all().await;
    assert!(host.session_names().is_empty());
    assert_eq!(log.count(event::CLOSED), 2);
}

#[tokio::test]
async fn test_router_over_raw_sessions() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut host = SessionHost::new(
        vec![scripts.provider("util", "raw", ECHO_SERVER)],
        fast_options(),
        log.clone(),
    );
    host.start_all().await;
    host.expose_tools().await;

    let router = ToolRouter::new(&host, RouteMode::Catalog, log.clone());
    let output = router.call("echo", &json!({})).await.unwrap();
    assert_eq!(output.segments.len(), 2);

    let err = router.call("nope", &json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::Routing(_)));

    assert_eq!(log.count(event::TOOL), 1);
    assert!(log.messages(event::TOOL)[0].contains("session=util"));

    host.stop_all().await;
}

#[tokio::test]
async fn test_turn_against_live_provider() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut host = SessionHost::new(
        vec![scripts.provider("util", "raw", ECHO_SERVER)],
        fast_options(),
        log.clone(),
    );
    host.start_all().await;
    host.expose_tools().await;
    let router = ToolRouter::new(&host, RouteMode::Live, log.clone());

    let model = Arc::new(
        ScriptedModel::new()
            .reply_tool_use("toolu_1", "echo", json!({"x": 1}))
            .reply_text("The provider answered."),
    );
    let mut orchestrator = Orchestrator::new(model.clone(), TurnOptions::default(), log.clone());

    let answer = orchestrator.run_turn(&router, "call echo").await.unwrap();
    assert_eq!(answer, "The provider answered.");

    let requests = model.requests();
    assert!(requests[0].tools[0].description.starts_with("[util] "));

    let follow_up: &Message = requests[1].messages.last().unwrap();
    assert_eq!(follow_up.content.len(), 1);
    assert!(follow_up.text().is_empty());

    host.stop_all().await;
}

#[tokio::test]
async fn test_structured_session_over_rmcp() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut host = SessionHost::new(
        vec![scripts.provider("structured", "stdio", ECHO_SERVER)],
        fast_options(),
        log.clone(),
    );

    let failures = host.start_all().await;
    assert!(failures.is_empty(), "{:?}", failures);

    let catalog = host.expose_tools().await;
    assert_eq!(catalog.len(), 2);

    let router = ToolRouter::new(&host, RouteMode::Catalog, log.clone());
    let output = router.call("echo", &json!({})).await.unwrap();
    assert_eq!(output.segments.last().map(String::as_str), Some("done"));

    host.stop_all().await;
}

#[tokio::test]
async fn test_structured_startup_failure_keeps_stderr() {
    let scripts = Scripts::new();
    let log = Arc::new(MemoryEventLog::new());
    let mut host = SessionHost::new(
        vec![scripts.provider("crashy", "stdio", CRASHING_SERVER)],
        fast_options(),
        log.clone(),
    );

    let failures = host.start_all().await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].session(), "crashy");
    if let StartupError::Handshake { message, .. } = &failures[0] {
        assert!(message.contains("ModuleNotFoundError"));
    }
    let stderr = log.messages(event::STDERR);
    assert_eq!(stderr.len(), 1);
    assert!(stderr[0].starts_with("[crashy] ModuleNotFoundError"));
}
