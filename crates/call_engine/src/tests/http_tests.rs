use super::*;
use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct SeenRequests {
    requests: Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>,
}

async fn spawn_engine_api(
    status: StatusCode,
    response: serde_json::Value,
) -> (Url, SeenRequests) {
    let seen = SeenRequests::default();
    let app = Router::new()
        .route(
            "/call/web",
            post(
                move |State(seen): State<SeenRequests>,
                      headers: HeaderMap,
                      Json(body): Json<serde_json::Value>| {
                    let response = response.clone();
                    async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|value| value.to_str().ok())
                            .map(ToString::to_string);
                        seen.requests.lock().await.push((auth, body));
                        (status, Json(response))
                    }
                },
            ),
        )
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let base = Url::parse(&format!("http://{addr}")).expect("url");
    (base, seen)
}

#[test]
fn web_call_endpoint_keeps_base_path() {
    let base = Url::parse("https://engine.example/api").expect("url");
    let url = endpoint(&base, WEB_CALL_PATH).expect("endpoint");
    assert_eq!(url.as_str(), "https://engine.example/api/call/web");

    let root = Url::parse(DEFAULT_API_BASE).expect("url");
    let url = endpoint(&root, WEB_CALL_PATH).expect("endpoint");
    assert_eq!(url.as_str(), "https://api.vapi.ai/call/web");
}

#[tokio::test]
async fn begin_posts_assistant_id_with_bearer_credential() {
    let (base, seen) = spawn_engine_api(
        StatusCode::CREATED,
        serde_json::json!({ "id": "call-1", "webCallUrl": "https://rooms.example/abc" }),
    )
    .await;
    let engine = HttpCallEngine::new(&base, ClientCredential::new("pk-test")).expect("engine");
    let mut events = engine.subscribe_events();

    let call = engine
        .begin(&SessionTargetId::new("assistant-7"))
        .await
        .expect("begin");

    assert_eq!(call.call_id, "call-1");
    assert_eq!(call.join_url.as_deref(), Some("https://rooms.example/abc"));

    let requests = seen.requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.as_deref(), Some("Bearer pk-test"));
    assert_eq!(requests[0].1["assistantId"], "assistant-7");

    assert_eq!(
        events.recv().await.expect("event"),
        CallEngineEvent::SessionStarted {
            call_id: "call-1".to_string()
        }
    );
}

#[tokio::test]
async fn begin_surfaces_rejected_start() {
    let (base, _seen) = spawn_engine_api(
        StatusCode::UNAUTHORIZED,
        serde_json::json!({ "message": "invalid key" }),
    )
    .await;
    let engine = HttpCallEngine::new(&base, ClientCredential::new("bad")).expect("engine");

    let err = engine
        .begin(&SessionTargetId::new("assistant-7"))
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("401"));

    engine
        .end("never-created")
        .await
        .expect("end without a call is a no-op");
}

#[tokio::test]
async fn begin_rejects_response_without_call_id() {
    let (base, _seen) =
        spawn_engine_api(StatusCode::OK, serde_json::json!({ "status": "queued" })).await;
    let engine = HttpCallEngine::new(&base, ClientCredential::default()).expect("engine");

    let err = engine
        .begin(&SessionTargetId::default())
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("malformed"));
}

#[tokio::test]
async fn end_releases_the_tracked_call() {
    let (base, _seen) =
        spawn_engine_api(StatusCode::CREATED, serde_json::json!({ "id": "call-9" })).await;
    let engine = HttpCallEngine::new(&base, ClientCredential::default()).expect("engine");
    engine
        .begin(&SessionTargetId::default())
        .await
        .expect("begin");

    let mut events = engine.subscribe_events();
    engine.end("call-9").await.expect("end");
    assert_eq!(
        events.recv().await.expect("event"),
        CallEngineEvent::SessionEnded {
            call_id: "call-9".to_string()
        }
    );

    engine.end("call-9").await.expect("second end");
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn end_for_a_stale_call_leaves_the_newer_one_open() {
    let (base, _seen) =
        spawn_engine_api(StatusCode::CREATED, serde_json::json!({ "id": "call-new" })).await;
    let engine = HttpCallEngine::new(&base, ClientCredential::default()).expect("engine");
    engine
        .begin(&SessionTargetId::default())
        .await
        .expect("begin");

    let mut events = engine.subscribe_events();
    engine.end("call-old").await.expect("stale end");
    assert!(events.try_recv().is_err());
    assert_eq!(*engine.open_calls.lock().await, vec!["call-new".to_string()]);
}
