#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

const CONFIG: &str = r#"{"sections":[
    {"id":"ads","name":"Ads","platform":"twitter","xpaths":["//div"]},
    {"id":"ads","name":"Ads","platform":"twitter"},
    {"id":"feed","name":"For You","platform":"twitter","currentPath":"/home","newPath":"/following"}
]}"#;

#[wasm_bindgen_test]
fn test_parse_config_stats() {
    let result = pf_wasm::parse_config(CONFIG).unwrap();
    let get = |key: &str| Reflect::get(&result, &JsValue::from_str(key)).unwrap();

    assert_eq!(get("before").as_f64(), Some(3.0));
    assert_eq!(get("after").as_f64(), Some(2.0));
    assert_eq!(get("deduped").as_f64(), Some(1.0));
    assert_eq!(Array::from(&get("sections")).length(), 2);
}

#[wasm_bindgen_test]
fn test_parse_config_rejects_garbage() {
    assert!(pf_wasm::parse_config("nope").is_err());
}

#[wasm_bindgen_test]
fn test_applies_to() {
    assert!(pf_wasm::applies_to("twitter", "mobile.x.com"));
    assert!(!pf_wasm::applies_to("twitter", "example.org"));
}
