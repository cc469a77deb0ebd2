//! Integration tests for preview sessions.
//!
//! These drive a session the way a host UI does: edits, environment
//! switches, refreshes and relayed console messages from the renderer.

use std::sync::Arc;

use serde_json::json;

use sandbox_preview::sandbox::{bind, MemoryRenderer};
use sandbox_preview::{
    generate, Environment, FileStore, LogKind, PreviewConfig, Session, Starter,
};

fn new_session() -> Session {
    Session::new(&PreviewConfig::default())
}

#[test]
fn unedited_files_survive_switch_round_trip() {
    let mut session = new_session();
    let defaults = FileStore::new();

    session.set_content("index.js", "document.title = 'x';");
    session.switch_environment(Environment::React);
    session.switch_environment(Environment::Vanilla);

    for name in ["index.html", "style.css"] {
        assert_eq!(
            session.content(name),
            Some(defaults.file(Environment::Vanilla, name).unwrap().content.as_str())
        );
    }
}

#[test]
fn vanilla_edits_survive_react_round_trip() {
    let mut session = new_session();
    session.set_content("index.html", "<main id=\"app\"></main>");
    session.set_content("style.css", "main { display: grid; }");

    session.switch_environment(Environment::React);
    session.set_content("src/App.js", "function App() { return <p>changed</p>; }");
    session.switch_environment(Environment::Vanilla);

    assert_eq!(session.content("index.html"), Some("<main id=\"app\"></main>"));
    assert_eq!(session.content("style.css"), Some("main { display: grid; }"));

    session.switch_environment(Environment::React);
    assert_eq!(
        session.content("src/App.js"),
        Some("function App() { return <p>changed</p>; }")
    );
}

#[test]
fn switch_always_clears_console_and_selects_first_file() {
    let mut session = new_session();
    let sender = session.relay_sender();

    for target in [Environment::React, Environment::Vanilla, Environment::React] {
        let last = session.files().last().unwrap().name.clone();
        session.select_file(&last);
        sender.console(LogKind::Log, "noise").unwrap();
        session.pump();
        assert!(!session.console().is_empty());

        session.switch_environment(target);

        assert!(session.console().is_empty());
        assert_eq!(
            session.active_file().unwrap().name,
            target.default_files()[0].name
        );
    }
}

#[test]
fn relayed_warn_appends_one_entry_at_the_end() {
    let mut session = new_session();
    let sender = session.relay_sender();
    sender.console(LogKind::Log, "first").unwrap();
    sender.console(LogKind::Error, "second").unwrap();
    session.pump();

    sender
        .post(json!({"type": "console", "logType": "warn", "message": "x"}))
        .unwrap();
    assert_eq!(session.pump(), 1);

    let entries = session.console().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].kind, LogKind::Warn);
    assert_eq!(entries[2].message, "x");
    assert_eq!(entries[0].message, "first");
}

#[test]
fn console_log_script_is_bridged_and_relayed() {
    let mut session = new_session();
    session.select_file("index.js");
    session.edit("console.log(\"hi\")");

    let document = session.snapshot().document;
    assert!(document.contains("<script>console.log(\"hi\")</script>"));
    assert!(document.contains("window.parent.postMessage({ type: 'console', logType: kind, message: args.join(' ') }, '*');"));

    // What the bridge posts when the script runs.
    session
        .relay_sender()
        .post_json(r#"{"type":"console","logType":"log","message":"hi"}"#)
        .unwrap();
    session.pump();

    let entries = session.console().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, LogKind::Log);
    assert_eq!(entries[0].message, "hi");
}

#[test]
fn clearing_console_in_react_keeps_files() {
    let mut session = new_session();
    session.switch_environment(Environment::React);
    session.set_content("src/style.css", "h1 { color: teal; }");
    let files_before = session.files();

    session.relay_sender().console(LogKind::Error, "boom").unwrap();
    session.pump();
    session.clear_console();

    assert!(session.console().is_empty());
    assert_eq!(session.files(), files_before);
}

#[test]
fn generate_is_pure_across_sessions() {
    let mut a = new_session();
    let mut b = new_session();
    a.set_content("index.js", "alert(1)");
    b.set_content("index.js", "alert(1)");

    assert_eq!(a.snapshot().document, b.snapshot().document);

    let contents = a.store().contents(Environment::Vanilla);
    assert_eq!(
        generate(Environment::Vanilla, &contents),
        generate(Environment::Vanilla, &contents)
    );
}

#[test]
fn starter_contents_flow_into_first_document() {
    let starter: Starter = serde_yaml::from_str(
        r#"
name: tabs
environment: vanilla
files:
  index.html: "<div class=\"tabs\"></div>"
"#,
    )
    .unwrap();
    let mut store = FileStore::new();
    starter.apply(&mut store).unwrap();

    let session = Session::with_store(&PreviewConfig::default(), store);

    assert!(session.snapshot().document.contains("<div class=\"tabs\"></div>"));
}

#[tokio::test]
async fn bound_renderer_sees_latest_snapshot_and_refresh() {
    let mut session = new_session();
    let renderer = Arc::new(MemoryRenderer::new());
    let handle = bind(renderer.clone(), session.subscribe());
    tokio::task::yield_now().await;

    session.set_content("index.js", "console.log('a')");
    tokio::task::yield_now().await;
    session.refresh();
    let last = session.snapshot();
    drop(session);

    handle.await.unwrap();
    let current = renderer.current().await.unwrap();
    assert_eq!(current.generation, last.generation);
    assert!(current.document.contains("console.log('a')"));
}

#[tokio::test]
async fn next_console_entry_waits_for_renderer_output() {
    let mut session = new_session();
    let sender = session.relay_sender();

    tokio::spawn(async move {
        sender.post(json!({"type": "ready"})).unwrap();
        sender
            .post(json!({
                "type": "console",
                "logType": "error",
                "message": "Error: x is not defined at line 3:7"
            }))
            .unwrap();
    });

    let entry = session.next_console_entry().await.unwrap();
    assert_eq!(entry.kind, LogKind::Error);
    assert_eq!(entry.message, "Error: x is not defined at line 3:7");
    assert_eq!(session.console().len(), 1);
}
