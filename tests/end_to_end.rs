use std::{net::SocketAddr, path::Path, sync::Arc};

use cupcake_mcp::{
    build_app,
    client::{driver, ClientError, Session},
    store::{Record, RecordStore},
    AppState,
};

async fn spawn_server() -> (SocketAddr, AppState) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/records.json");
    let store = RecordStore::load(&path).expect("bundled records should load");
    spawn_server_with(store).await
}

async fn spawn_server_with(store: RecordStore) -> (SocketAddr, AppState) {
    let state = AppState::new(Arc::new(store));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let app = build_app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("server runs");
    });

    (addr, state)
}

#[tokio::test]
async fn driver_prints_search_and_fetch_results() {
    let (addr, state) = spawn_server().await;
    let mut out = Vec::<u8>::new();

    driver::run(&format!("http://{addr}/mcp"), &mut out)
        .await
        .expect("driver run succeeds");

    let printed = String::from_utf8(out).expect("utf8 output");
    let lines = printed.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "=============");
    assert!(lines.contains(&"- 47 Chocolate Cupcake Order"));
    assert!(lines.contains(&"- id: 47"));
    assert!(lines.contains(&"- url: null"));
    assert!(lines.contains(&"- metadata: {\"flavor\":\"chocolate\"}"));
    assert_eq!(lines.last(), Some(&"result: Chocolate Cupcake Order"));

    assert!(state.sessions.is_empty(), "driver must close its session");
}

#[tokio::test]
async fn session_lists_capabilities_and_calls_tools() {
    let (addr, state) = spawn_server().await;
    let session = Session::open(format!("http://{addr}/mcp"))
        .await
        .expect("session opens");
    assert!(session.session_id().is_some());
    assert_eq!(state.sessions.len(), 1);

    session.ping().await.expect("ping");
    let tools = session.list_tools().await.expect("tools");
    assert_eq!(
        tools.iter().map(|tool| tool.name.as_str()).collect::<Vec<_>>(),
        vec!["search", "fetch"]
    );
    assert_eq!(session.list_resources().await.expect("resources").len(), 1);
    assert!(session.list_prompts().await.expect("prompts").is_empty());

    let upper = session.search("CUPCAKES").await.expect("search");
    let lower = session.search("cupcakes").await.expect("search");
    assert_eq!(upper, lower);
    assert!(upper.results.iter().any(|result| result.id == "47"));
    assert!(session.search("   ").await.expect("search").results.is_empty());

    let order = session.fetch("47").await.expect("fetch");
    assert_eq!(order.title, "Chocolate Cupcake Order");
    assert_eq!(order.url, None);
    assert_eq!(session.fetch("47").await.expect("fetch"), order);

    let err = session
        .fetch("nonexistent")
        .await
        .expect_err("unknown id must fail");
    assert!(matches!(err, ClientError::Rpc { ref message, .. } if message == "unknown id"));

    session.close().await.expect("close");
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn closed_session_is_rejected() {
    let (addr, state) = spawn_server().await;
    let session = Session::open(format!("http://{addr}/mcp"))
        .await
        .expect("session opens");
    let id = session.session_id().expect("session id").to_string();
    assert!(state.sessions.close(&id));

    let err = session.ping().await.expect_err("closed session");
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn driver_closes_session_when_a_call_fails() {
    let store = RecordStore::from_records(vec![Record {
        id: "1".to_string(),
        title: "Plain Cupcakes".to_string(),
        text: "Six plain cupcakes".to_string(),
        url: None,
        metadata: None,
    }])
    .expect("valid store");
    let (addr, state) = spawn_server_with(store).await;
    let mut out = Vec::<u8>::new();

    let outcome = driver::run(&format!("http://{addr}/mcp"), &mut out).await;

    assert!(matches!(
        outcome,
        Err(ClientError::Rpc { ref message, .. }) if message == "unknown id"
    ));
    let printed = String::from_utf8(out).expect("utf8 output");
    assert!(printed.contains("- 1 Plain Cupcakes"));
    assert!(state.sessions.is_empty(), "failed run must still close its session");
}
