//! CLI integration tests
//!
//! These tests run the built binary against the schemas in `tests/fixtures`.

#![cfg(feature = "cli")]

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn classmodel_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_xsd-classmodel"))
}

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().to_string()
}

// ============================================================================
// Compile Command Tests
// ============================================================================

#[test]
fn test_cli_compile_to_stdout() {
    let output = Command::new(classmodel_bin())
        .args(["compile", &fixture("groups.xsd")])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "compile should succeed");
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert!(json["groups"]["G"].is_object());
    assert!(json["classes"]["Holder"].is_object());
}

#[test]
fn test_cli_compile_to_file_with_indexes() {
    let dir = tempfile::tempdir().unwrap();
    let subtypes = dir.path().join("subtypes.xml");
    fs::write(
        &subtypes,
        r#"<groups><group name="BAR" complexTypes="ALPHA//BETA"/></groups>"#,
    )
    .unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"wrappers": {"mode": "disabled"}}"#).unwrap();
    let out = dir.path().join("model.json");

    let output = Command::new(classmodel_bin())
        .args([
            "compile",
            &fixture("references.xsd"),
            "--subtype-index",
            subtypes.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--pretty",
            "--output",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "compile should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let methods = json["classes"]["Owner"]["methods"].as_array().unwrap();
    let destinations = methods
        .iter()
        .filter(|m| m["kind"] == "destination_lookup")
        .count();
    assert_eq!(destinations, 2);
    assert!(json["wrappers"].as_array().unwrap().is_empty());
}

#[test]
fn test_cli_compile_missing_schema() {
    let output = Command::new(classmodel_bin())
        .args(["compile", "does-not-exist.xsd"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "missing schema should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"), "should report an error");
}

#[test]
fn test_cli_compile_unresolved_reference() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("broken.xsd");
    fs::write(
        &schema,
        r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:AR="urn:ar">
            <xsd:group name="BROKEN">
                <xsd:sequence><xsd:group ref="AR:MISSING"/></xsd:sequence>
            </xsd:group>
        </xsd:schema>"#,
    )
    .unwrap();

    let output = Command::new(classmodel_bin())
        .args(["compile", schema.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MISSING"), "should name the missing group");
}

// ============================================================================
// Inspect Command Tests
// ============================================================================

#[test]
fn test_cli_inspect_summary() {
    let output = Command::new(classmodel_bin())
        .args(["inspect", &fixture("mixed.xsd"), "--groups", "--classes"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "inspect should succeed");
    assert!(stdout.contains("xsd-classmodel"), "should show version");
    assert!(stdout.contains("Groups: 1"));
    assert!(stdout.contains("Classes: 2"));
    assert!(stdout.contains("TEXT-ELEMENTS -> TextElements (mixed)"));
    assert!(stdout.contains("Paragraph : 2 attributes"));
}

#[test]
fn test_cli_inspect_reports_warnings() {
    let output = Command::new(classmodel_bin())
        .args(["inspect", &fixture("groups.xsd")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Warnings: 1"));
    assert!(stdout.contains("needs manual review"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(classmodel_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("compile"));
    assert!(stdout.contains("inspect"));
}
