#![cfg(target_arch = "wasm32")]
use folio_motion_wasm::{abi_version, FolioStage};
use js_sys::Function;
use serde::Serialize;
use serde_json::{json, Value};
use serde_wasm_bindgen as swb;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn about_spec() -> JsValue {
    let spec = json!({
        "id": "about",
        "descriptors": [
            {
                "target": "about.header",
                "delta": { "dy": 100, "opacity": 0 },
                "ease": "power2.out",
                "window": { "start": "top 90%", "end": "top 60%" },
                "mode": { "kind": "scrubbed", "lag": 0 }
            }
        ]
    });
    spec.serialize(&swb::Serializer::json_compatible()).unwrap()
}

fn stage() -> FolioStage {
    let mut stage = FolioStage::new(JsValue::UNDEFINED).unwrap();
    stage.set_viewport(0.0, 900.0);
    stage.set_target("about.header", 980.0, 120.0);
    stage
}

fn frame(v: JsValue) -> Value {
    swb::from_value(v).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults_and_config() {
    assert!(FolioStage::new(JsValue::NULL).is_ok());
    let cfg = json!({ "scrub_lag": 0.5 })
        .serialize(&swb::Serializer::json_compatible())
        .unwrap();
    assert!(FolioStage::new(cfg).is_ok());
}

#[wasm_bindgen_test]
fn mount_scroll_and_unmount() {
    let mut stage = stage();
    let id = stage.mount_section(about_spec()).unwrap();
    assert_eq!(id, 0);

    let f = frame(stage.step(1.0 / 60.0, None).unwrap());
    assert_eq!(f["epoch"].as_f64(), Some(1.0));
    assert_eq!(f["changes"][0]["target"], json!("about.header"));
    assert_eq!(f["changes"][0]["state"]["opacity"], json!(0.0));

    stage.set_scroll(1000.0);
    for _ in 0..30 {
        stage.step(1.0 / 60.0, None).unwrap();
    }
    let s: Value = swb::from_value(stage.target_state("about.header").unwrap()).unwrap();
    assert_eq!(s["opacity"], json!(1.0));

    assert!(stage.unmount_section("about"));
    assert!(!stage.unmount_section("about"));
}

#[wasm_bindgen_test]
fn invalid_spec_is_an_error() {
    let mut stage = stage();
    assert!(stage.mount_section(JsValue::NULL).is_err());
    let bad = json!({ "id": "x", "descriptors": [ { "target": "a", "ease": "spring" } ] })
        .serialize(&swb::Serializer::json_compatible())
        .unwrap();
    assert!(stage.mount_section(bad).is_err());
}

#[wasm_bindgen_test]
fn render_loop_presents_and_stops_on_lost_context() {
    let mut stage = stage();
    stage.start_render_loop();
    let ok = Function::new_with_args("state", "return true;");
    stage.step_at(0.0, Some(ok.clone())).unwrap();
    let f = frame(stage.step_at(16.0, Some(ok)).unwrap());
    assert_eq!(f["object"]["frame"].as_f64(), Some(1.0));

    let lost = Function::new_with_args("state", "return false;");
    let f = frame(stage.step_at(32.0, Some(lost)).unwrap());
    assert!(f["object"].is_null());
    assert!(!stage.is_rendering());
}
