//! Router-level integration tests
//!
//! Drive the full HTTP surface against the in-memory record store.
//!
//! Run with: cargo test integration_tests

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::{header, HeaderValue, StatusCode};
    use axum::Router;
    use axum_test::TestServer;
    use chrono::Locale;
    use serde_json::{json, Value};

    use crate::adapters::firebase::stream::{SseEvent, SseParser};
    use crate::adapters::InMemoryRecordStore;
    use crate::app::{now_millis, SubmissionPolicy};
    use crate::config::{Config, StoreBackend};
    use crate::domain::entities::NewIdea;
    use crate::domain::ports::RecordStore;
    use crate::test_utils::{snapshot_of, test_record, FailingRecordStore};
    use crate::{build_router, AppState};

    fn test_config() -> Config {
        Config {
            port: 0,
            store_backend: StoreBackend::Memory,
            firebase_url: None,
            firebase_auth: None,
            ideas_path: "ideas".to_string(),
            submission: SubmissionPolicy::default(),
            date_locale: Locale::en_US,
            rate_limit_enabled: false,
        }
    }

    fn server_for<S: RecordStore + 'static>(store: Arc<S>) -> (TestServer, AppState<S>) {
        let state = AppState::new(store, &test_config());
        let router = build_router(state.clone(), false).unwrap();
        (TestServer::new(router).unwrap(), state)
    }

    fn json_accept() -> HeaderValue {
        HeaderValue::from_static("application/json")
    }

    #[tokio::test]
    async fn health_check() {
        let (server, _) = server_for(Arc::new(InMemoryRecordStore::new()));

        let response = server.get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    #[tokio::test]
    async fn empty_board_renders_placeholder() {
        let (server, _) = server_for(Arc::new(InMemoryRecordStore::new()));

        let response = server.get("/ideas").await;

        response.assert_status_ok();
        assert!(response.text().contains("No ideas yet"));
    }

    #[tokio::test]
    async fn submit_then_read_feed() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (server, state) = server_for(store.clone());

        let response = server
            .post("/ideas")
            .json(&json!({ "name": "  Ann ", "text": "Add a dark theme" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["success"], true);
        let id = body["id"].as_str().unwrap().to_string();

        state.feed_service.refresh().await.unwrap();

        let feed = server
            .get("/ideas")
            .add_header(header::ACCEPT, json_accept())
            .await
            .json::<Value>();
        assert_eq!(feed["mode"], "newest");
        assert_eq!(feed["total_ideas"], 1);
        assert_eq!(feed["items"][0]["id"], id.as_str());
        assert_eq!(feed["items"][0]["author"], "Ann");
        assert_eq!(feed["items"][0]["text"], "Add a dark theme");
        assert_eq!(feed["items"][0]["is_new"], true);
        assert_eq!(feed["items"][0]["relative_time"], "just now");
    }

    #[tokio::test]
    async fn empty_text_is_rejected_without_write() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (server, _) = server_for(store.clone());

        let response = server
            .post("/ideas")
            .json(&json!({ "name": "Ann", "text": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Validation error");
        assert!(store.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn over_long_text_is_rejected() {
        let (server, _) = server_for(Arc::new(InMemoryRecordStore::new()));

        let response = server
            .post("/ideas")
            .json(&json!({ "text": "x".repeat(301) }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn filter_modes_order_feed() {
        let now = now_millis();
        let store = Arc::new(InMemoryRecordStore::new().with_records(snapshot_of(vec![
            ("A", test_record("x", now - 3 * 86_400_000, 3, 1)),
            ("B", test_record("y", now - 60_000, 0, 0)),
        ])));
        let (server, state) = server_for(store);
        state.feed_service.refresh().await.unwrap();

        let ids = |feed: Value| -> Vec<String> {
            feed["items"]
                .as_array()
                .unwrap()
                .iter()
                .map(|item| item["id"].as_str().unwrap().to_string())
                .collect()
        };

        let top = server
            .get("/ideas")
            .add_query_param("filter", "top")
            .add_header(header::ACCEPT, json_accept())
            .await
            .json::<Value>();
        assert_eq!(ids(top), ["A", "B"]);

        let newest = server
            .get("/ideas")
            .add_query_param("filter", "newest")
            .add_header(header::ACCEPT, json_accept())
            .await
            .json::<Value>();
        assert_eq!(ids(newest), ["B", "A"]);

        let today = server
            .get("/ideas")
            .add_query_param("filter", "today")
            .add_header(header::ACCEPT, json_accept())
            .await
            .json::<Value>();
        assert_eq!(today["total_ideas"], 2);
        assert_eq!(ids(today), ["B"]);
    }

    #[tokio::test]
    async fn unknown_filter_is_bad_request() {
        let (server, _) = server_for(Arc::new(InMemoryRecordStore::new()));

        let response = server.get("/ideas").add_query_param("filter", "hot").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn vote_increments_counter() {
        let store = Arc::new(
            InMemoryRecordStore::new()
                .with_records(snapshot_of(vec![("idea1", test_record("x", 1_000, 0, 0))])),
        );
        let (server, _) = server_for(store.clone());

        server.post("/ideas/idea1/likes").await.assert_status_ok();
        server.post("/ideas/idea1/dislikes").await.assert_status_ok();
        server.post("/ideas/idea1/likes").await.assert_status_ok();

        let snapshot = store.snapshot().await.unwrap();
        let record = snapshot.values().next().unwrap();
        assert_eq!(record.like_count, 2);
        assert_eq!(record.dislike_count, 1);
    }

    #[tokio::test]
    async fn vote_errors() {
        let (server, _) = server_for(Arc::new(InMemoryRecordStore::new()));

        server
            .post("/ideas/missing/likes")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post("/ideas/missing/meh")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_outage_is_bad_gateway() {
        let (server, _) = server_for(Arc::new(FailingRecordStore));

        let response = server
            .post("/ideas")
            .json(&json!({ "text": "idea" }))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        assert!(response.json::<Value>().get("details").is_none());
    }

    #[tokio::test]
    async fn presence_heartbeat_counts_sessions() {
        let (server, _) = server_for(Arc::new(InMemoryRecordStore::new()));

        server
            .post("/presence")
            .json(&json!({ "session_id": "tab-1" }))
            .await
            .assert_status_ok();
        let response = server
            .post("/presence")
            .json(&json!({ "session_id": "tab-2" }))
            .await;
        assert_eq!(response.json::<Value>()["online"], 2);

        let current = server.get("/presence").await.json::<Value>();
        assert_eq!(current["online"], 2);

        server
            .post("/presence")
            .json(&json!({ "session_id": "../etc" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn index_page_renders_board() {
        let store = Arc::new(
            InMemoryRecordStore::new()
                .with_records(snapshot_of(vec![("idea1", test_record("Shiny", 1_000, 0, 0))])),
        );
        let (server, state) = server_for(store);
        state.feed_service.refresh().await.unwrap();

        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("<title>Idea Board</title>"));
        assert!(html.contains("Shiny"));
        assert!(html.contains(r#"<b id="totalIdeas">1</b>"#));
    }

    // ===== live feed =====

    /// Serve the router on a real socket, since the SSE body never ends
    async fn spawn_live(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    /// Reads `feed` events off an open SSE response
    struct FeedEvents {
        response: reqwest::Response,
        parser: SseParser,
        ready: VecDeque<SseEvent>,
    }

    impl FeedEvents {
        async fn open(url: &str) -> Self {
            let response = reqwest::get(url).await.unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            Self {
                response,
                parser: SseParser::new(),
                ready: VecDeque::new(),
            }
        }

        async fn next(&mut self) -> Value {
            loop {
                if let Some(event) = self.ready.pop_front() {
                    assert_eq!(event.event, "feed");
                    return serde_json::from_str(&event.data).unwrap();
                }
                let chunk = tokio::time::timeout(Duration::from_secs(5), self.response.chunk())
                    .await
                    .expect("feed event within 5s")
                    .unwrap()
                    .expect("stream still open");
                self.ready.extend(self.parser.push(&chunk).unwrap());
            }
        }

        /// Skip events until one satisfies `done`
        async fn next_matching(&mut self, done: impl Fn(&Value) -> bool) -> Value {
            loop {
                let update = self.next().await;
                if done(&update) {
                    return update;
                }
            }
        }
    }

    #[tokio::test]
    async fn live_feed_sends_current_feed_then_updates() {
        let store = Arc::new(
            InMemoryRecordStore::new()
                .with_records(snapshot_of(vec![("idea1", test_record("First", 1_000, 0, 0))])),
        );
        let state = AppState::new(store.clone(), &test_config());
        state.feed_service.refresh().await.unwrap();
        tokio::spawn(state.feed_service.clone().run());
        let base = spawn_live(build_router(state, false).unwrap()).await;

        let mut events = FeedEvents::open(&format!("{}/ideas/stream", base)).await;

        let first = events.next().await;
        assert_eq!(first["total_ideas"], 1);
        assert!(first["html"].as_str().unwrap().contains("First"));

        store
            .append(&NewIdea {
                author: "\rEve".to_string(),
                text: "Second".to_string(),
            })
            .await
            .unwrap();

        let update = events
            .next_matching(|update| update["total_ideas"] == 2)
            .await;
        let html = update["html"].as_str().unwrap();
        assert!(html.contains("Second"));
        assert!(html.find("Second").unwrap() < html.find("First").unwrap());
        assert!(html.contains(r#"<div class="author-avatar">E</div>"#));
    }

    #[tokio::test]
    async fn live_feed_applies_filter() {
        let now = now_millis();
        let store = Arc::new(InMemoryRecordStore::new().with_records(snapshot_of(vec![
            ("old", test_record("Old idea", now - 3 * 86_400_000, 9, 0)),
            ("new", test_record("New idea", now - 60_000, 0, 0)),
        ])));
        let state = AppState::new(store, &test_config());
        state.feed_service.refresh().await.unwrap();
        let base = spawn_live(build_router(state, false).unwrap()).await;

        let mut events = FeedEvents::open(&format!("{}/ideas/stream?filter=today", base)).await;

        let first = events.next().await;
        let html = first["html"].as_str().unwrap();
        assert_eq!(first["total_ideas"], 2);
        assert!(html.contains("New idea"));
        assert!(!html.contains("Old idea"));
    }

    #[tokio::test]
    async fn live_feed_rejects_unknown_filter() {
        let (server, _) = server_for(Arc::new(InMemoryRecordStore::new()));

        let response = server
            .get("/ideas/stream")
            .add_query_param("filter", "hot")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
