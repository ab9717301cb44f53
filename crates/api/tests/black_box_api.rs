use reqwest::StatusCode;
use serde_json::{json, Value};

use cargohold_infra::{InfraConfig, StoreKind};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Same router as prod, over in-memory stores seeded with the sample hold.
    async fn spawn() -> Self {
        let config = InfraConfig {
            store: StoreKind::Memory,
            seed_sample: true,
            ..InfraConfig::default()
        };
        let services = cargohold_api::app::services::build_services(&config).unwrap();
        let app = cargohold_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn seeded_hold_is_reported() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, srv.url("/api/get_storage_status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["storage_stats"]["container_count"], 2);
    assert_eq!(body["waste_stats"]["container_count"], 1);
    assert_eq!(body["item_stats"]["total_active_items"], 2);
}

#[tokio::test]
async fn place_find_and_retrieve() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/api/place_item"),
        json!({
            "item_id": "item_100",
            "name": "Bolt Kit",
            "volume": 1.5,
            "weight": 0.4,
            "category": "tools"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["item_id"], "item_100");
    assert!(body["container_id"].is_string());

    let (status, body) = get(&client, srv.url("/api/find_item?query=bolt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["item_id"], "item_100");
    assert!(body["items"][0]["estimated_retrieval_time_minutes"].is_number());

    let (status, body) = post(&client, srv.url("/api/retrieve_item/item_100"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["id"], "item_100");

    let (status, body) = get(&client, srv.url("/api/item/item_100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["name"], "Bolt Kit");
    assert!(body["item"]["container"]["accessibility_factor"].is_number());
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/api/place_item"),
        json!({"item_id": "item_200", "name": "Crate", "volume": 1.0, "weight": 1.0, "container_id": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = post(
        &client,
        srv.url("/api/place_item"),
        json!({"item_id": "item_201", "volume": 1.0, "weight": 1.0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = post(
        &client,
        srv.url("/api/add_container"),
        json!({"container_id": "storage_001", "total_volume": 10.0, "max_weight": 10.0}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = post(&client, srv.url("/api/mark_as_waste"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = post(
        &client,
        srv.url("/api/undock_plan"),
        json!({"module_id": "waste_001", "type": "return"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/api/rearrange_items"))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn waste_lifecycle_over_http() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        srv.url("/api/mark_as_waste"),
        json!({"item_id": "item_001", "reason": "expired"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["waste_container"], "waste_001");

    let (status, body) = get(&client, srv.url("/api/return_planning/waste_001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["return_plan"]["total_items"], 1);
    assert_eq!(body["return_plan"]["waste_items"][0]["item_id"], "item_001");

    let (status, body) = post(
        &client,
        srv.url("/api/undock_plan"),
        json!({"module_id": "waste_001", "undock_date": "2030-01-15"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["undock_date"], "2030-01-15");
    assert_eq!(body["items_count"], 1);

    let (status, body) = post(&client, srv.url("/api/confirm_return/waste_001"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items_removed"], 1);

    let (status, _) = get(&client, srv.url("/api/return_planning/waste_001")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logs_are_newest_first_with_total() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    get(&client, srv.url("/api/find_item?query=medical")).await;
    post(&client, srv.url("/api/retrieve_item/item_002"), json!({})).await;
    get(&client, srv.url("/api/item/item_002")).await;

    let (status, body) = get(&client, srv.url("/api/logs?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_logs"], 3);
    assert_eq!(body["logs"].as_array().unwrap().len(), 2);
    assert_eq!(body["logs"][0]["action"], "view_item");
    assert_eq!(body["logs"][1]["action"], "retrieve_item");

    let (_, body) = get(&client, srv.url("/api/logs?action_type=search_item")).await;
    assert_eq!(body["total_logs"], 1);
    assert_eq!(body["logs"][0]["details"]["results"][0], "item_002");

    let (status, body) = get(&client, srv.url("/api/efficiency_metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["efficiency_metrics"]["average_retrieval_time_seconds"].is_number());
}
