use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;
use techcard_test_utils::pipe_tree;

fn techcard(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_techcard"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn json_file(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_decode_prints_ordered_flat_view() {
    let wire = json_file(&pipe_tree());
    let output = techcard(&["decode", wire.path().to_str().unwrap()]);
    assert!(output.status.success());

    let flat = stdout_json(&output);
    let keys: Vec<_> = flat
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["key"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, vec!["1.0", "1.1.4", "1.1.10", "2.1", "2.10"]);
    assert_eq!(flat[3]["valueType"], json!("integer"));
}

#[test]
fn test_decode_accepts_double_encoded_body() {
    let encoded = Value::String(pipe_tree().to_string());
    let wire = json_file(&encoded);
    let output = techcard(&["decode", wire.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output).as_array().unwrap().len(), 5);
}

#[test]
fn test_encode_with_edits_and_type() {
    let wire = json_file(&pipe_tree());
    let edits = json_file(&json!({"2.1": "300", "2.10": ""}));
    let output = techcard(&[
        "encode",
        wire.path().to_str().unwrap(),
        "--edits",
        edits.path().to_str().unwrap(),
        "--type",
        "plate",
    ]);
    assert!(output.status.success());

    let payload = stdout_json(&output);
    assert_eq!(payload["type"], json!("plate"));
    assert_eq!(payload["params"]["2"]["params"]["1"]["val"], json!("300"));
    assert_eq!(payload["params"]["2"]["params"]["10"]["val"], json!(8.5));
}

#[test]
fn test_validate_verdicts() {
    let output = techcard(&["validate", "double", "12,5"]);
    assert!(output.status.success());
    let verdict = stdout_json(&output);
    assert_eq!(verdict["isValid"], json!(true));
    assert_eq!(verdict["normalized"], json!("12.5"));

    let output = techcard(&["validate", "int", "abc"]);
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["errorMessage"], json!("Enter a whole number"));

    let output = techcard(&["validate", "int", "-12"]);
    assert!(output.status.success());
}

#[test]
fn test_config_labels_apply() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[labels]\nblock = \"Блок\"\nparam = \"Параметр\"").unwrap();
    let wire = json_file(&json!({"params": {"4": {"params": {"2": {"val": 1}}}}}));

    let output = techcard(&[
        "--config",
        config.path().to_str().unwrap(),
        "decode",
        wire.path().to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let flat = stdout_json(&output);
    assert_eq!(flat[0]["blockName"], json!("Блок 4"));
    assert_eq!(flat[0]["name"], json!("Параметр 2"));
}

#[test]
fn test_bad_config_fails() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "request_timeout_secs = 0").unwrap();
    let output = techcard(&["--config", config.path().to_str().unwrap(), "validate", "int", "1"]);
    assert!(!output.status.success());
}
