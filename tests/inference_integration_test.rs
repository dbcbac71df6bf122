//! Integration tests for the inference pipeline against artifacts
//! produced by the real training pipeline.

mod common;

use maintenance_predictor::{
    artifacts::ArtifactStore,
    defaults,
    inference::InferencePipeline,
    schema::{FormValue, LABELS},
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

fn build_pipeline(dir: &Path) -> InferencePipeline {
    let artifact_config = common::train_fixture(dir);
    let store = ArtifactStore::load(&artifact_config).unwrap();
    InferencePipeline::new(Arc::new(store))
}

fn valid_form() -> HashMap<String, String> {
    [
        ("Operation_Mode", "Active"),
        ("Temperature_C", "75.0"),
        ("Vibration_Hz", "52.0"),
        ("Power_Consumption_kW", "34.0"),
        ("Network_Latency_ms", "14.0"),
        ("Packet_Loss_%", "0.7"),
        ("Quality_Control_Defect_Rate_%", "1.4"),
        ("Production_Speed_units_per_hr", "115.0"),
        ("Predictive_Maintenance_Score", "50.0"),
        ("Error_Rate_%", "1.1"),
        ("Year", "2026"),
        ("Month", "8"),
        ("Day", "7"),
        ("Hour", "13"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn test_valid_submission_decodes_known_label() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(dir.path());

    let mut form_values = defaults::fallback_defaults();
    let label = pipeline.run(&valid_form(), &mut form_values).unwrap();

    assert!(LABELS.contains(&label.as_str()), "unexpected label {}", label);
}

#[test]
fn test_repeated_submissions_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(dir.path());
    let form = valid_form();

    let mut first_values = defaults::fallback_defaults();
    let first = pipeline.run(&form, &mut first_values).unwrap();

    for _ in 0..5 {
        let mut form_values = defaults::fallback_defaults();
        let label = pipeline.run(&form, &mut form_values).unwrap();
        assert_eq!(label, first);
    }
}

#[test]
fn test_empty_submission_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(dir.path());

    let mut form_values = defaults::fallback_defaults();
    let label = pipeline.run(&HashMap::new(), &mut form_values).unwrap();

    assert!(LABELS.contains(&label.as_str()));
    // The absent mode field defaults to the first known choice
    assert_eq!(
        form_values.get("Operation_Mode"),
        Some(&FormValue::Text("Idle".to_string()))
    );
}

#[test]
fn test_unknown_mode_surfaces_label_in_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(dir.path());

    let mut form = valid_form();
    form.insert("Operation_Mode".to_string(), "Standby".to_string());

    let mut form_values = defaults::fallback_defaults();
    let err = pipeline.run(&form, &mut form_values).unwrap_err();
    assert_eq!(err.to_string(), "Unknown Operation_Mode 'Standby'.");
}

#[test]
fn test_parse_failure_keeps_fields_parsed_before_it() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(dir.path());

    let mut form = valid_form();
    form.insert("Temperature_C".to_string(), "abc".to_string());

    let mut form_values = defaults::fallback_defaults();
    let err = pipeline.run(&form, &mut form_values).unwrap_err();

    assert!(err.to_string().contains("Temperature_C"));
    // The mode slot precedes the failed field and keeps its parsed value
    assert_eq!(
        form_values.get("Operation_Mode"),
        Some(&FormValue::Text("Active".to_string()))
    );
    // The failed field keeps its resolved default
    assert!(matches!(
        form_values.get("Temperature_C"),
        Some(&FormValue::Float(_))
    ));
}

#[test]
fn test_pipeline_never_panics_on_hostile_input() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(dir.path());

    let hostile = [
        ("Temperature_C", ""),
        ("Temperature_C", "NaN NaN"),
        ("Temperature_C", "1e999999"),
        ("Operation_Mode", ""),
        ("Operation_Mode", "<script>"),
        ("Vibration_Hz", "-"),
    ];

    for (field, value) in hostile {
        let mut form = valid_form();
        form.insert(field.to_string(), value.to_string());

        let mut form_values = defaults::fallback_defaults();
        // Must come back as a Result either way, never unwind
        let _ = pipeline.run(&form, &mut form_values);
    }
}
