//! Router tests (in-process, no socket)

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use damage_core::logic::features::layout_hash;
use damage_core::logic::startup::EngineSettings;
use damage_core::{Runtime, ScoringConfig};

use crate::config::Config;
use crate::{create_router, AppState};

fn app() -> Router {
    let runtime = tokio_test::assert_ok!(Runtime::build(EngineSettings::new(ScoringConfig::linear())));
    create_router(AppState::new(runtime, Config::default()))
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn image_body(detections: Value) -> Value {
    json!({
        "shipment_id": "SHP-0042",
        "image_name": "container_17.jpg",
        "frame": { "width": 100, "height": 100 },
        "detections": detections
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["config_version"], "linear-v1.0.0");
}

#[tokio::test]
async fn test_inspect_image_warning() {
    let detections = json!([
        { "class_id": 0, "confidence": 0.9, "bbox": [0, 0, 10, 10] },
        { "class_id": 0, "confidence": 0.8, "bbox": [0, 0, 20, 20] },
        { "class_name": "rust", "confidence": 0.7, "bbox": [0, 0, 30, 30] }
    ]);
    let (status, body) = call(app(), "POST", "/api/v1/inspect/image", Some(image_body(detections))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity_score"], 4.0);
    assert_eq!(body["risk_level"], "WARNING");
    assert_eq!(body["damage_counts"]["dent"], 2);
    assert_eq!(body["damage_counts"]["rust"], 1);
    assert_eq!(body["notification"]["status"], "scheduled");
    assert!(body["sop_recommendation"].as_str().unwrap().contains("Manual inspection"));
}

#[tokio::test]
async fn test_inspect_image_empty_is_none() {
    let (status, body) = call(app(), "POST", "/api/v1/inspect/image", Some(image_body(json!([])))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity_score"], 0.0);
    assert_eq!(body["risk_level"], "NONE");
    assert_eq!(body["notification"]["status"], "suppressed");
}

#[tokio::test]
async fn test_malformed_detection_is_bad_request() {
    let detections = json!([{ "class_id": 9, "confidence": 0.5, "bbox": [0, 0, 1, 1] }]);
    let (status, body) = call(app(), "POST", "/api/v1/inspect/image", Some(image_body(detections))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["stage"], "detection_adapter");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_zero_frame_rejected_by_validation() {
    let mut body = image_body(json!([]));
    body["frame"]["width"] = json!(0);
    let (status, _) = call(app(), "POST", "/api/v1/inspect/image", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inspect_video_truncated() {
    let leak = json!({ "class_id": 3, "confidence": 0.9, "bbox": [0, 0, 10, 10] });
    let body = json!({
        "shipment_id": "SHP-VID",
        "video_name": "gate_cam.mp4",
        "frame": { "width": 100, "height": 100 },
        "frames": [
            { "detections": [leak] },
            { "error": "corrupt packet" },
            { "detections": [leak, leak] }
        ]
    });
    let (status, body) = call(app(), "POST", "/api/v1/inspect/video", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video"]["frames_processed"], 1);
    assert_eq!(body["video"]["termination"]["status"], "truncated");
    assert_eq!(body["damage_counts"]["leak"], 1);
    assert_eq!(body["risk_level"], "WARNING");
}

#[tokio::test]
async fn test_unreadable_video_is_bad_request() {
    let body = json!({
        "shipment_id": "SHP-VID",
        "video_name": "broken.mp4",
        "frame": { "width": 640, "height": 480 },
        "frames": [{ "error": "moov atom not found" }]
    });
    let (status, body) = call(app(), "POST", "/api/v1/inspect/video", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["stage"], "video_accumulator");
}

#[tokio::test]
async fn test_classify_boundaries() {
    let (status, body) = call(app(), "POST", "/api/v1/alerts/classify", Some(json!({ "score": 2.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "WARNING");
    assert_eq!(body["notify"], true);
    assert_eq!(body["threshold_version"], "linear-v1.0.0");

    let (_, body) = call(app(), "POST", "/api/v1/alerts/classify", Some(json!({ "score": 1.5 }))).await;
    assert_eq!(body["tier"], "INFO");
    assert_eq!(body["notify"], false);

    let (status, _) = call(app(), "POST", "/api/v1/alerts/classify", Some(json!({ "score": -1.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_and_models() {
    let (status, body) = call(app(), "GET", "/api/v1/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "linear");
    assert_eq!(body["thresholds"]["high"], 5.0);
    assert_eq!(body["policy"]["send_info"], false);

    let (status, body) = call(app(), "GET", "/api/v1/models", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["key"], "sop");
    assert_eq!(body[0]["kind"], "retrieval");
}

#[tokio::test]
async fn test_notification_stats_after_dispatch() {
    let app = app();
    let detections = json!([{ "class_id": 3, "confidence": 0.9, "bbox": [0, 0, 10, 10] },
                            { "class_id": 3, "confidence": 0.9, "bbox": [0, 0, 10, 10] }]);
    let (status, _) = call(app.clone(), "POST", "/api/v1/inspect/image", Some(image_body(detections))).await;
    assert_eq!(status, StatusCode::OK);

    let mut sent = 0;
    for _ in 0..100 {
        let (_, stats) = call(app.clone(), "GET", "/api/v1/notifications/stats", None).await;
        sent = stats["sent"].as_u64().unwrap();
        if sent == 1 {
            assert_eq!(stats["notifier"], "log");
            assert_eq!(stats["recent"][0]["tier"], "CRITICAL");
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(sent, 1);
}

#[tokio::test]
async fn test_inspect_image_model_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("severity.json");
    std::fs::write(
        &path,
        format!(r#"{{"coefficients": [0.0, 0.0, 0.0], "intercept": 0.0, "layout_hash": {}}}"#, layout_hash()),
    )
    .unwrap();

    let mut settings = EngineSettings::new(ScoringConfig::model_weighted());
    settings.model_path = Some(path);
    let runtime = tokio_test::assert_ok!(Runtime::build(settings));
    let app = create_router(AppState::new(runtime, Config::default()));

    let detections = json!([{ "class_id": 0, "confidence": 0.9, "bbox": [0, 0, 10, 10] }]);
    let (status, body) = call(app, "POST", "/api/v1/inspect/image", Some(image_body(detections))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity_score"], 0.5);
    assert_eq!(body["risk_level"], "INFO");
    assert_eq!(body["config_version"], "v1.0.0");
    assert_eq!(body["notification"]["cause"]["reason"], "policy_disabled");
}
