use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use gridiron_common::{Pool, Stance};
use gridiron_war_room::jitter::ZeroJitter;
use gridiron_war_room::routes::{router, AppState};
use gridiron_war_room::testing::{argument, debate};
use gridiron_war_room::{WarRoom, WarRoomDeps};

fn app(dir: &tempfile::TempDir) -> Router {
    let deps = WarRoomDeps::builder()
        .content_dir(dir.path().join("content"))
        .debate_log_dir(dir.path().join("debate-logs"))
        .build();
    router(Arc::new(AppState {
        war_room: WarRoom::with_jitter(deps, Box::new(ZeroJitter)),
    }))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn college_debate() -> Value {
    serde_json::to_value(
        debate("Jalen Cross", Pool::College)
            .position("WR")
            .with_argument(argument(Stance::Underrated, 80.0).with_stats(3))
            .with_argument(argument(Stance::Overrated, 40.0))
            .with_evidence(3, 2)
            .build(),
    )
    .unwrap()
}

#[tokio::test]
async fn health_reports_service_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "gridiron-war-room");
    assert_eq!(body["totalProspectsGraded"], 0);
    assert_eq!(body["rankingsCount"]["highSchool"], 0);
}

#[tokio::test]
async fn delivery_flows_into_queries() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = post(
        &app,
        "/api/scout-delivery",
        &json!({ "runId": "RUN-1", "debateCount": 1, "debates": [college_debate()] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true, "runId": "RUN-1", "prospectsGraded": 1 }));

    let (status, body) = get(&app, "/api/rankings?pool=college").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pool"], "college");
    assert_eq!(body["total"], 1);
    assert_eq!(body["rankings"][0]["rank"], 1);
    assert_eq!(body["rankings"][0]["position"], "WR");
    assert_eq!(body["rankings"][0]["trend"], "NEW");
    assert_eq!(body["rankings"][0]["tier"], "SLEEPER");

    let (_, body) = get(&app, "/api/rankings?pool=highSchool").await;
    assert_eq!(body["total"], 0);

    let (status, body) = get(&app, "/api/dossier?name=Jalen%20Cross").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prospectName"], "Jalen Cross");
    assert_eq!(body["debateOutcome"], "SIDE_A_WINS");
    assert_eq!(body["compositeGrade"], 58);

    let (_, body) = get(&app, "/api/content?type=NARRATIVE").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["producedBy"], "Boomer_Analyst_Ang");

    let (_, body) = get(&app, "/api/content").await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["kind"], "AUDIO_SCRIPT");

    let (_, body) = get(&app, "/api/status").await;
    assert_eq!(body["lastDelivery"]["runId"], "RUN-1");
    assert_eq!(body["state"]["totalContentPieces"], 2);
    assert_eq!(body["filmRoomEnabled"], false);
}

#[tokio::test]
async fn content_and_status_match_dashboard_shape() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let debates: Vec<Value> = ["Ava Reed", "Ben Ortiz", "Cole Park"]
        .iter()
        .map(|name| {
            let mut record = college_debate();
            record["prospect"]["name"] = json!(name);
            record
        })
        .collect();
    let (status, _) = post(
        &app,
        "/api/scout-delivery",
        &json!({ "runId": "RUN-3", "debates": debates }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/content?limit=2").await;
    assert_eq!(body["total"], 6);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert!(body.get("content").is_none());

    let (_, body) = get(&app, "/api/content?limit=0").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 6);

    let (_, body) = get(&app, "/api/rankings?limit=0").await;
    assert_eq!(body["rankings"].as_array().unwrap().len(), 3);

    let (_, body) = get(&app, "/api/status").await;
    let state = &body["state"];
    assert_eq!(state["totalProspectsGraded"], 3);
    assert_eq!(state["totalContentPieces"], 6);
    assert_eq!(state["activeDossiers"], 3);
    assert_eq!(state["rankings"]["highSchool"], 0);
    assert_eq!(state["rankings"]["college"], 3);
    assert_eq!(state["contentQueue"], 6);
    assert!(state["lastScoutDelivery"].is_string());

    let connections = &body["connections"];
    assert!(connections["filmRoom"].is_null());
    assert!(connections["scoutHub"].is_string());
    assert!(connections["chickenhawkCore"].is_string());
    assert_eq!(connections["elevenLabsConfigured"], false);
    assert_eq!(connections["braveConfigured"], false);
}

#[tokio::test]
async fn unknown_dossier_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = get(&app, "/api/dossier?name=Nobody").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Nobody"));
}

#[tokio::test]
async fn bad_query_parameters_are_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = get(&app, "/api/rankings?pool=juco").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = get(&app, "/api/content?type=VIDEO").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/dossier").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_delivery_is_400_and_grades_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let mut nameless = college_debate();
    nameless["prospect"]["name"] = json!("");
    let (status, _) = post(
        &app,
        "/api/scout-delivery",
        &json!({ "runId": "RUN-2", "debates": [college_debate(), nameless] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/api/scout-delivery", &json!({ "debates": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["totalProspectsGraded"], 0);
}

#[tokio::test]
async fn manual_grade_is_a_preview() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = post(&app, "/api/grade", &college_debate()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["compositeGrade"], 58);
    assert_eq!(body["adjustment"]["evaluatorConfidence"], 63);

    let (_, body) = get(&app, "/api/rankings").await;
    assert_eq!(body["pool"], "all");
    assert_eq!(body["total"], 0);

    let (status, _) = get(&app, "/api/dossier?name=Jalen%20Cross").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn debate_schema_is_published() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let (status, body) = get(&app, "/api/schema/debate").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "DebateRecord");
    assert!(body["properties"]["debateId"].is_object());
}
