use std::sync::Arc;
use std::time::{Duration, Instant};

use agent::{DispatchOptions, ToolDispatcher, ToolRegistry};
use proto::{SessionId, ToolError};
use tools::testing::{PageCall, RecordingPage, StaticContext};

fn builtin_registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for module in [
        tools::navigation::tools(),
        tools::interaction::tools(),
        tools::scroll::tools(),
    ] {
        registry
            .register(module.expect("module definitions"))
            .expect("module registers");
    }
    Arc::new(registry)
}

#[tokio::test]
async fn validation_failure_names_tool_and_fields() {
    let page = Arc::new(RecordingPage::new());
    let dispatcher = ToolDispatcher::new(
        SessionId::new(),
        builtin_registry(),
        Arc::new(StaticContext::with_page(page.clone())),
        DispatchOptions::default(),
    );

    let err = dispatcher
        .dispatch("browser_scroll", &serde_json::json!({}))
        .await
        .expect_err("empty scroll rejected");
    match err {
        ToolError::Validation { tool, issues } => {
            assert_eq!(tool, "browser_scroll");
            assert_eq!(issues.len(), 1);
            assert!(issues[0].message.contains("deltaX"));
            assert!(issues[0].message.contains("deltaY"));
        }
        other => panic!("unexpected error variant: {other}"),
    }
    assert!(page.calls().is_empty());
}

#[tokio::test]
async fn no_active_tab_stops_before_any_driver_call() {
    let page = Arc::new(RecordingPage::new());
    let context = Arc::new(StaticContext::with_page(page.clone()));
    context.detach();
    let dispatcher = ToolDispatcher::new(
        SessionId::new(),
        builtin_registry(),
        context.clone(),
        DispatchOptions::default(),
    );

    let err = dispatcher
        .dispatch("browser_scroll", &serde_json::json!({"deltaY": 100}))
        .await
        .expect_err("no tab attached");
    assert!(matches!(err, ToolError::NoActiveTab));
    assert!(page.calls().is_empty());

    context.attach(page.clone());
    dispatcher
        .dispatch("browser_scroll", &serde_json::json!({"deltaY": 100}))
        .await
        .expect("tab attached again");
    assert_eq!(
        page.calls(),
        vec![PageCall::MouseWheel {
            delta_x: 0.0,
            delta_y: 100.0
        }]
    );
}

#[tokio::test]
async fn navigate_then_scroll_reports_snapshot_only_for_navigation() {
    let page = Arc::new(RecordingPage::new());
    let dispatcher = ToolDispatcher::new(
        SessionId::new(),
        builtin_registry(),
        Arc::new(StaticContext::with_page(page.clone())),
        DispatchOptions::default(),
    );

    let navigated = dispatcher
        .dispatch("browser_navigate", &serde_json::json!({"url": "https://example.com/docs"}))
        .await
        .expect("navigate");
    let snapshot = navigated.snapshot.expect("navigation snapshots the page");
    assert_eq!(snapshot.url, "https://example.com/docs");

    let scrolled = dispatcher
        .dispatch("browser_scroll", &serde_json::json!({"deltaY": -100}))
        .await
        .expect("scroll");
    assert!(scrolled.snapshot.is_none());
    assert!(scrolled.code.iter().any(|line| line.contains("(0, -100)")));

    assert_eq!(
        page.calls(),
        vec![
            PageCall::Goto("https://example.com/docs".to_string()),
            PageCall::Snapshot,
            PageCall::MouseWheel {
                delta_x: 0.0,
                delta_y: -100.0
            },
        ]
    );
}

#[tokio::test]
async fn calls_in_one_session_never_overlap() {
    let page = Arc::new(RecordingPage::new());
    page.set_action_delay(Duration::from_millis(100));
    let dispatcher = ToolDispatcher::new(
        SessionId::new(),
        builtin_registry(),
        Arc::new(StaticContext::with_page(page.clone())),
        DispatchOptions::default(),
    );

    let first_params = serde_json::json!({"deltaX": 1});
    let second_params = serde_json::json!({"deltaX": 2});

    let started = Instant::now();
    let (first, second) = tokio::join!(
        dispatcher.dispatch("browser_scroll", &first_params),
        dispatcher.dispatch("browser_scroll", &second_params),
    );
    first.expect("first scroll");
    second.expect("second scroll");

    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(page.calls().len(), 2);
}
