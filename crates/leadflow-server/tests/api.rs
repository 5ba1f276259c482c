use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use leadflow_server::build_router;
use tempfile::TempDir;
use tower::ServiceExt;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    leadflow_core::workspace::init(dir.path(), "test").unwrap();
    dir
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Status taxonomy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn statuses_endpoint_lists_full_taxonomy() {
    let dir = workspace();
    let app = build_router(dir.path().to_path_buf());

    let response = app.oneshot(get_request("/api/statuses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["default_status"], "not_contacted");
    let stages = json["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 6);

    let status_count: usize = stages
        .iter()
        .map(|s| s["statuses"].as_array().unwrap().len())
        .sum();
    assert_eq!(status_count, 14);

    // hidden statuses never appear in quick actions
    for stage in stages {
        for status in stage["statuses"].as_array().unwrap() {
            for action in status["quick_actions"].as_array().unwrap() {
                assert_ne!(action, "not_contacted");
                assert_ne!(action, "contacted");
                assert_ne!(action, "pending_agreement");
                assert_ne!(action, "future_interest");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn webhook_requires_name() {
    let dir = workspace();
    let app = build_router(dir.path().to_path_buf());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/webhook/leads",
            serde_json::json!({ "name": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_creates_lead_at_initial_status() {
    let dir = workspace();
    let app = build_router(dir.path().to_path_buf());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/webhook/leads",
            serde_json::json!({
                "name": "Acme Corp",
                "email": "hello@acme.test",
                "utm_source": "google",
                "utm_campaign": "spring",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["status"], "not_contacted");
    assert!(json["id"].is_string());
}

// ---------------------------------------------------------------------------
// Lead CRUD and status changes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lead_crud_round_trip() {
    let dir = workspace();
    let root = dir.path().to_path_buf();

    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            "/api/leads",
            serde_json::json!({ "name": "Globex", "expected_revenue": 5000.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "not_contacted");
    assert_eq!(created["stage"], "follow_up");

    let response = build_router(root.clone())
        .oneshot(get_request(&format!("/api/leads/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["name"], "Globex");
    assert_eq!(detail["events"].as_array().unwrap().len(), 1);

    // direct overwrite to a status nowhere in not_contacted's suggestions
    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            &format!("/api/leads/{id}/status"),
            serde_json::json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["stage"], "signed");
}

#[tokio::test]
async fn strict_status_change_rejects_off_graph_target() {
    let dir = workspace();
    let root = dir.path().to_path_buf();

    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            "/api/leads",
            serde_json::json!({ "name": "Initech" }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            &format!("/api/leads/{id}/status"),
            serde_json::json!({ "status": "completed", "strict": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = build_router(root)
        .oneshot(json_request(
            "POST",
            &format!("/api/leads/{id}/status"),
            serde_json::json!({ "status": "contacted", "strict": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let dir = workspace();
    let root = dir.path().to_path_buf();

    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            "/api/leads",
            serde_json::json!({ "name": "Acme" }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = build_router(root)
        .oneshot(json_request(
            "POST",
            &format!("/api/leads/{id}/status"),
            serde_json::json!({ "status": "bogus_status" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_lead_is_404() {
    let dir = workspace();
    let app = build_router(dir.path().to_path_buf());

    let id = uuid::Uuid::new_v4();
    let response = app
        .oneshot(get_request(&format!("/api/leads/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn soft_delete_hides_lead_from_list() {
    let dir = workspace();
    let root = dir.path().to_path_buf();

    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            "/api/leads",
            serde_json::json!({ "name": "Gone Inc" }),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = build_router(root.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/leads/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_router(root.clone())
        .oneshot(get_request("/api/leads"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);

    let response = build_router(root.clone())
        .oneshot(get_request("/api/leads?include_deleted=true"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // restore brings it back
    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            &format!("/api/leads/{id}/restore"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = build_router(root)
        .oneshot(get_request("/api/leads"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn kpis_reflect_created_leads() {
    let dir = workspace();
    let root = dir.path().to_path_buf();

    for (name, revenue) in [("A", 10000.0), ("B", 2000.0)] {
        let response = build_router(root.clone())
            .oneshot(json_request(
                "POST",
                "/api/leads",
                serde_json::json!({ "name": name, "expected_revenue": revenue, "probability": 80.0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = build_router(root.clone())
        .oneshot(get_request("/api/kpis"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let kpis = body_json(response).await;
    assert_eq!(kpis["total_leads"], 2);
    assert_eq!(kpis["follow_up"], 2);
    assert_eq!(kpis["conversion_rate"], 0.0);
    assert_eq!(kpis["total_pipeline_value"], 12000.0);

    let response = build_router(root)
        .oneshot(get_request("/api/kpis/funnel"))
        .await
        .unwrap();
    let funnel = body_json(response).await;
    assert_eq!(funnel.as_array().unwrap().len(), 6);
    assert_eq!(funnel[0]["stage"], "follow_up");
    assert_eq!(funnel[0]["count"], 2);
}

// ---------------------------------------------------------------------------
// Playbooks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn playbook_crud_round_trip() {
    let dir = workspace();
    let root = dir.path().to_path_buf();

    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            "/api/playbooks",
            serde_json::json!({
                "slug": "objection-handling",
                "title": "Objection handling",
                "content": "# When they say it's too expensive\n",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // duplicate slug conflicts
    let response = build_router(root.clone())
        .oneshot(json_request(
            "POST",
            "/api/playbooks",
            serde_json::json!({ "slug": "objection-handling", "title": "Again" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = build_router(root.clone())
        .oneshot(get_request("/api/playbooks/objection-handling"))
        .await
        .unwrap();
    let playbook = body_json(response).await;
    assert_eq!(playbook["title"], "Objection handling");
    assert!(playbook["content"]
        .as_str()
        .unwrap()
        .contains("too expensive"));

    let response = build_router(root)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/playbooks/objection-handling")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
