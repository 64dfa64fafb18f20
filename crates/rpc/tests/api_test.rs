//! HTTP contract tests against an in-memory prediction log.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use choco_model::{
    round_score, CategoricalColumn, EncoderSet, FeatureVector, LabelEncoder, LinearModel,
    LoadedArtifacts,
};
use choco_rpc::{build_router, start_server, AppContext};
use choco_storage::MemoryPredictionLog;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn artifacts() -> LoadedArtifacts {
    let mut encoders = EncoderSet::new();
    encoders.insert(
        CategoricalColumn::SalesPerson,
        LabelEncoder::fit("Sales Person", ["Ches Bonnell", "Jehu Rudeforth", "Van Tuxwell"])
            .unwrap(),
    );
    encoders.insert(
        CategoricalColumn::Country,
        LabelEncoder::fit("Country", ["Australia", "India", "UK"]).unwrap(),
    );
    encoders.insert(
        CategoricalColumn::Product,
        LabelEncoder::fit("Product", ["85% Dark Bars", "Eclairs", "Mint Chip Choco"]).unwrap(),
    );

    let model = LinearModel::new(vec![12.5, -40.25, 7.125, 21.333], 3210.987, 100).unwrap();
    let model_hash = model.model_hash().unwrap();
    LoadedArtifacts {
        model,
        encoders,
        model_hash,
    }
}

fn setup() -> (Router, Arc<AppContext>, MemoryPredictionLog) {
    let log = MemoryPredictionLog::new();
    let context = Arc::new(AppContext::new(artifacts(), Arc::new(log.clone())));
    (build_router(context.clone()), context, log)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_predict(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn assert_close(got: f64, want: f64) {
    assert!((got - want).abs() < 1e-9, "{got} != {want}");
}

fn scenario_payload() -> Value {
    json!({
        "sales_person": "Jehu Rudeforth",
        "country": "UK",
        "product": "Mint Chip Choco",
        "boxes": 50
    })
}

#[tokio::test]
async fn test_predict_known_categories() {
    let (router, context, log) = setup();
    let payload = scenario_payload();

    let (status, body) = send(&router, post_predict(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    // Jehu Rudeforth = 1, UK = 2, Mint Chip Choco = 2
    let raw = context.model().predict(&FeatureVector([1.0, 2.0, 2.0, 50.0]));
    assert_close(body["score"].as_f64().unwrap(), round_score(raw));
    assert_eq!(body.as_object().unwrap().len(), 1);

    assert_eq!(log.len(), 1);
    let (_, history) = send(&router, get("/history")).await;
    assert_eq!(history[0]["datos_entrada"], payload);
    assert_close(history[0]["venta_predicha"].as_f64().unwrap(), raw);
}

#[tokio::test]
async fn test_boxes_as_string() {
    let (router, _, _) = setup();
    let mut as_text = scenario_payload();
    as_text["boxes"] = json!("50");

    let (_, numeric) = send(&router, post_predict(scenario_payload().to_string())).await;
    let (status, text) = send(&router, post_predict(as_text.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(numeric, text);
}

#[tokio::test]
async fn test_unseen_category_uses_first_class() {
    let (router, context, log) = setup();
    let payload = json!({
        "sales_person": "Someone New",
        "country": "Narnia",
        "product": "Mint Chip Choco",
        "boxes": 10
    });

    let (status, body) = send(&router, post_predict(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let encoders = context.encoders();
    assert_eq!(
        encoders.get(CategoricalColumn::SalesPerson).unwrap().fallback_class(),
        "Ches Bonnell"
    );
    assert_eq!(
        encoders.get(CategoricalColumn::Country).unwrap().fallback_class(),
        "Australia"
    );

    let raw = context.model().predict(&FeatureVector([0.0, 0.0, 2.0, 10.0]));
    assert_close(body["score"].as_f64().unwrap(), round_score(raw));
    assert_eq!(log.len(), 1);

    let prediction = context.predict(&payload).await.unwrap();
    assert_eq!(
        prediction.fallbacks,
        vec![CategoricalColumn::SalesPerson, CategoricalColumn::Country]
    );
}

#[tokio::test]
async fn test_missing_boxes_is_error_without_log_row() {
    let (router, _, log) = setup();
    let payload = json!({
        "sales_person": "Jehu Rudeforth",
        "country": "UK",
        "product": "Mint Chip Choco"
    });

    let (status, body) = send(&router, post_predict(payload.to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("error").is_some());
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_error() {
    let (router, _, log) = setup();

    let (status, body) = send(&router, post_predict("sales_person=Jehu")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("malformed request"));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_database_down_fails_predict() {
    let (router, _, log) = setup();
    log.set_available(false);

    let (status, body) = send(&router, post_predict(scenario_payload().to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("error").is_some());

    log.set_available(true);
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_history_newest_first_and_capped() {
    let (router, _, _) = setup();
    for boxes in 1..=12 {
        let mut payload = scenario_payload();
        payload["boxes"] = json!(boxes);
        let (status, _) = send(&router, post_predict(payload.to_string())).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, history) = send(&router, get("/history")).await;
    assert_eq!(status, StatusCode::OK);

    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0]["datos_entrada"]["boxes"], json!(12));
    assert_eq!(entries[9]["datos_entrada"]["boxes"], json!(3));

    let ids: Vec<i64> = entries.iter().map(|e| e["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] > pair[1]));
    for entry in entries {
        for key in ["id", "datos_entrada", "venta_predicha", "fecha"] {
            assert!(entry.get(key).is_some(), "missing {key}");
        }
    }
}

#[tokio::test]
async fn test_history_database_down() {
    let (router, _, log) = setup();
    log.set_available(false);

    let (status, body) = send(&router, get("/history")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_health_reports_model_hash() {
    let (router, context, _) = setup();

    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_hash"], context.model_hash());
}

#[tokio::test]
async fn test_start_server_reports_busy_port() {
    let (_, context, _) = setup();
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap().to_string();

    let err = start_server(context, &addr).await.unwrap_err();
    assert!(err.to_string().contains(&addr), "{err}");
}
