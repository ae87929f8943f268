#![cfg(target_arch = "wasm32")]

use airways_engine::AirwaysSession;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn field(value: &JsValue, key: &str) -> JsValue {
    let json: serde_json::Value = serde_wasm_bindgen::from_value(value.clone()).unwrap();
    serde_wasm_bindgen::to_value(&json[key]).unwrap()
}

fn object(json: serde_json::Value) -> JsValue {
    use serde::Serialize;
    json.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).unwrap()
}

#[wasm_bindgen_test]
fn constructs_with_defaults() {
    let session = AirwaysSession::new(JsValue::UNDEFINED).unwrap();
    let snapshot = session.snapshot_js();
    assert_eq!(field(&snapshot, "topology").as_string().as_deref(), Some("curated"));
}

#[wasm_bindgen_test]
fn rejects_invalid_config() {
    let config = object(serde_json::json!({ "arc_resolution": 0 }));
    assert!(AirwaysSession::new(config).is_err());
}

#[wasm_bindgen_test]
fn disrupt_and_correct_round_trip() {
    let mut session = AirwaysSession::new(JsValue::NULL).unwrap();
    let disrupted = session.disrupt_routes();
    assert_eq!(field(&disrupted, "status").as_string().as_deref(), Some("applied"));

    let corrected = session.correct_js();
    assert_eq!(field(&corrected, "status").as_string().as_deref(), Some("applied"));

    let frame = session.tick(0.016);
    assert!(!frame.is_null());
}

#[wasm_bindgen_test]
fn malformed_command_is_noop() {
    let mut session = AirwaysSession::new(JsValue::NULL).unwrap();
    let command = object(serde_json::json!({ "type": "explode" }));
    let result = session.dispatch_js(command);
    assert_eq!(field(&result, "status").as_string().as_deref(), Some("no_op"));
}
