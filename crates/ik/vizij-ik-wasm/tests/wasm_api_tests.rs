#![cfg(target_arch = "wasm32")]
use serde_wasm_bindgen as swb;
use vizij_ik_wasm::{abi_version, VizijIk};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use vizij_ik_core::IkConfig;

const ARM: [f32; 9] = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0];

fn approx(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
}

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(VizijIk::new(JsValue::UNDEFINED).is_ok());
}

#[wasm_bindgen_test]
fn construct_rejects_invalid_config() {
    let cfg = swb::to_value(&IkConfig::default().with_chain_length(0)).unwrap();
    assert!(VizijIk::new(cfg).is_err());
}

#[wasm_bindgen_test]
fn construct_rejects_oversized_chain() {
    let cfg = swb::to_value(&IkConfig::default().with_chain_length(u32::MAX as usize)).unwrap();
    assert!(VizijIk::new(cfg).is_err());
}

#[wasm_bindgen_test]
fn unreachable_target_stretches() {
    let mut ik = VizijIk::new(JsValue::NULL).unwrap();
    let out = ik.solve(Some(vec![0.0, 0.0, 3.0]), None, &ARM).unwrap();
    assert!(approx(&out, &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0]));
    assert!((ik.total_length() - 2.0).abs() < 1e-6);
    assert_eq!(ik.debug_segments().len(), 12);
    assert!(!ik.last_outcome().unwrap().is_null());
}

#[wasm_bindgen_test]
fn missing_target_returns_pose() {
    let mut ik = VizijIk::new(JsValue::NULL).unwrap();
    let out = ik.solve(None, None, &ARM).unwrap();
    assert_eq!(out, ARM.to_vec());
}

#[wasm_bindgen_test]
fn reconfigure_changes_chain_length() {
    let cfg = swb::to_value(&IkConfig::default().with_chain_length(1).with_iterations(4)).unwrap();
    let mut ik = VizijIk::new(JsValue::NULL).unwrap();
    ik.initialize(&ARM).unwrap();
    assert_eq!(ik.bone_lengths().len(), 2);

    ik.reconfigure(cfg).unwrap();
    let out = ik
        .solve(Some(vec![1.0, 0.0, 0.0]), None, &[0.0, 0.0, 0.0, 0.0, 2.0, 0.0])
        .unwrap();
    assert!(approx(&out, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
    assert_eq!(ik.bone_lengths(), vec![2.0]);
}

#[wasm_bindgen_test]
fn ragged_pose_is_an_error() {
    let mut ik = VizijIk::new(JsValue::NULL).unwrap();
    assert!(ik.solve(Some(vec![0.0, 1.0, 0.0]), None, &[0.0, 1.0]).is_err());
}
