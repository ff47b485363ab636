// Integration tests for loading templates from a server

use std::{cell::Cell, rc::Rc, time::Duration};

use msgtmpl::{
    ApplicationState, MemoryStorage, RemoteSource, Template, TemplateStore, DEFAULT_STORAGE_KEY,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// Serves a single HTTP response on a local port and returns its URL.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{}/templates", addr)
}

fn seeded_store() -> TemplateStore {
    let store = TemplateStore::with_state(
        ApplicationState {
            templates: vec![Template {
                id: 1,
                title: "Local".to_string(),
                content: "kept".to_string(),
                created_at: "2024-01-01T00:00:00.000Z".to_string(),
            }],
            selected_template_id: Some(1),
        },
        MemoryStorage::new(),
        DEFAULT_STORAGE_KEY,
    );
    store.set_remote(RemoteSource::new(Duration::from_secs(5)));
    store
}

fn count_notifications(store: &TemplateStore) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    let _ = store.subscribe(move || c.set(c.get() + 1));
    count
}

#[tokio::test]
async fn test_server_list_replaces_templates() {
    let url = serve_once(
        "200 OK",
        r#"[{"id":10,"title":"Remote A","content":"hi","createdAt":"2024-02-01T00:00:00.000Z"},
            {"id":11,"title":"Remote B","createdAt":"2024-02-02T00:00:00.000Z"}]"#,
    )
    .await;
    let store = seeded_store();
    let count = count_notifications(&store);

    assert!(store.load_templates_from_server(&url).await);

    let state = store.get_state();
    let titles: Vec<&str> = state.templates.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Remote A", "Remote B"]);
    assert_eq!(state.templates[1].content, "");
    // The old selection is not re-homed
    assert_eq!(state.selected_template_id, Some(1));
    assert_eq!(count.get(), 1);

    // Fresh ids do not collide with the fetched ones
    assert!(store.add_template("after") > 11);
}

#[tokio::test]
async fn test_server_error_leaves_state_untouched() {
    let url = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let store = seeded_store();
    let before = store.get_state();
    let count = count_notifications(&store);

    assert!(!store.load_templates_from_server(&url).await);

    assert_eq!(store.get_state(), before);
    assert_eq!(count.get(), 0);
}

#[tokio::test]
async fn test_malformed_body_leaves_state_untouched() {
    let url = serve_once("200 OK", r#"{"templates": "not a list"}"#).await;
    let store = seeded_store();
    let before = store.get_state();

    assert!(!store.load_templates_from_server(&url).await);
    assert_eq!(store.get_state(), before);
}

#[tokio::test]
async fn test_unreachable_server_leaves_state_untouched() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = seeded_store();
    let before = store.get_state();

    assert!(
        !store
            .load_templates_from_server(&format!("http://{}/templates", addr))
            .await
    );
    assert_eq!(store.get_state(), before);
}
