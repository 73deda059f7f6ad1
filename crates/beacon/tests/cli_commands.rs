#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "beacon-cmd-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn beacon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_beacon"));
    cmd.env_remove("BEACON_LOG_LEVEL").args(["--log-level", "error"]);
    cmd
}

#[test]
fn check_summarizes_definitions() {
    let dir = unique_temp_dir("check");
    let path = dir.join("order.json");
    std::fs::write(
        &path,
        r#"{
            "name": "order",
            "version": 4,
            "fields": {
                "id": { "rules": [{ "rule": "is_string" }] },
                "note": { "required": false },
                "lines": {
                    "rules": [{
                        "rule": "array",
                        "min_items": 1,
                        "items": { "rule": "object", "fields": { "sku": { "rule": "is_string" } } }
                    }]
                }
            }
        }"#,
    )
    .expect("definition should be writable");

    let output = beacon()
        .args(["--format", "json", "check"])
        .arg(&path)
        .output()
        .expect("check should run");

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert!(json["schema_id"]
        .as_str()
        .is_some_and(|id| id.ends_with("definition-check.schema.json")));
    let def = &json["definitions"][0];
    assert_eq!(def["name"], "order");
    assert_eq!(def["version"], 4);
    assert_eq!(def["fields"], 3);
    assert_eq!(def["required"], 2);
    assert_eq!(def["depth"], 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_rejects_unknown_rule() {
    let dir = unique_temp_dir("check-bad");
    let path = dir.join("bad.json");
    std::fs::write(
        &path,
        r#"{"name": "bad", "version": 1, "fields": {"x": {"rules": [{"rule": "is_uuid"}]}}}"#,
    )
    .expect("definition should be writable");

    let output = beacon()
        .arg("check")
        .arg(&path)
        .output()
        .expect("check should run");

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid schema"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = beacon().arg("version").output().expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(&format!("beacon {}", env!("CARGO_PKG_VERSION"))));

    let extended = beacon()
        .args(["version", "--extended"])
        .output()
        .expect("version should run");
    assert!(String::from_utf8_lossy(&extended.stdout).contains("default_max_depth: 128"));
}

#[test]
fn envinfo_reports_schema_dir() {
    let output = beacon()
        .args(["--format", "json", "envinfo"])
        .env("BEACON_SCHEMA_DIR", "/srv/schemas")
        .output()
        .expect("envinfo should run");

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["environment"]["BEACON_SCHEMA_DIR"], "/srv/schemas");
    assert!(json["features"]
        .as_array()
        .is_some_and(|features| features.iter().any(|f| f == "cli")));
}
