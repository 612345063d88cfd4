//! BDD step definitions for dashboard feature

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request};
use cucumber::{then, when};
use tower::ServiceExt;

use device_console::command::{CommandDispatcher, SimulatedTransport};
use device_console::dashboard::build_router;
use device_console::self_test::{SelfTestOutcome, SelfTestResult};
use device_console::state::current_epoch_ms;
use device_console::telemetry::{ReadingStatus, TelemetryReading};

use crate::world::ConsoleWorld;

fn router(world: &ConsoleWorld) -> axum::Router {
    let state = world.state();
    let dispatcher = world.dispatcher.clone().unwrap_or_else(|| {
        Arc::new(CommandDispatcher::new(
            Arc::new(SimulatedTransport::new(Duration::from_millis(10))),
            &state,
        ))
    });
    build_router(state, dispatcher)
}

async fn send(world: &mut ConsoleWorld, request: Request<Body>) {
    let response = router(world).oneshot(request).await.unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[when(expr = "a reading of {float} degrees and a {string} self-test for {string} arrive")]
async fn data_arrives(world: &mut ConsoleWorld, temperature: f64, outcome: String, device: String) {
    let outcome = match outcome.as_str() {
        "PASS" => SelfTestOutcome::Pass,
        "FAIL" => SelfTestOutcome::Fail,
        other => panic!("Unknown outcome: {}", other),
    };
    let state = world.state();
    let mut s = state.write().await;
    let now = current_epoch_ms();
    s.record_reading(TelemetryReading {
        device_id: "esp32-01".to_string(),
        timestamp_epoch_ms: now,
        temperature,
        status: ReadingStatus::Ok,
    });
    s.record_self_test(SelfTestResult {
        device_id: device,
        timestamp_epoch_ms: now,
        outcome,
    });
}

#[when(expr = "{string} is requested from the dashboard")]
async fn request_path(world: &mut ConsoleWorld, path: String) {
    send(
        world,
        Request::builder().uri(path).body(Body::empty()).unwrap(),
    )
    .await;
}

#[when(expr = "the command request {string} is posted")]
async fn post_command(world: &mut ConsoleWorld, body: String) {
    send(
        world,
        Request::builder()
            .method("POST")
            .uri("/api/commands")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
}

#[then(expr = "the response status is {int}")]
fn response_status(world: &mut ConsoleWorld, expected: u16) {
    assert_eq!(world.response_status, Some(expected));
}

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut ConsoleWorld, expected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(
        body.contains(&expected),
        "Expected response to contain '{}', but it didn't.\nResponse body:\n{}",
        expected,
        body
    );
}

#[then(expr = "the JSON field {string} is {string}")]
fn json_field(world: &mut ConsoleWorld, pointer: String, expected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    let json: serde_json::Value = serde_json::from_str(body).expect("response is not JSON");
    let value = json
        .pointer(&pointer)
        .unwrap_or_else(|| panic!("no field at {}", pointer));
    let actual = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    assert_eq!(actual, expected);
}
