//! Integration tests for environment-file persistence semantics.

use std::fs;

use serde_json::Value;

use cookiesync_core::envfile::{EnvFileError, update_value};
use cookiesync_core::{Cookie, cookie_header};

/// Worked end-to-end example: cookie collection through persistence.
#[test]
fn test_cookie_string_persisted_into_environment_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let env_path = temp_dir.path().join("STG-Env.postman_environment.json");
    fs::write(
        &env_path,
        r#"{"values":[{"key":"company_cookie","value":"OLD"}]}"#,
    )
    .unwrap();

    let cookies = vec![
        Cookie::new("session_id", "abc123"),
        Cookie::new("csrf", "xyz789"),
    ];
    let cookie_string = cookie_header(&cookies);
    assert_eq!(cookie_string, "session_id=abc123; csrf=xyz789");

    update_value(&env_path, "company_cookie", &cookie_string).unwrap();

    let document: Value = serde_json::from_str(&fs::read_to_string(&env_path).unwrap()).unwrap();
    assert_eq!(
        document["values"][0]["value"].as_str().unwrap(),
        "session_id=abc123; csrf=xyz789"
    );
}

/// A realistic Postman export keeps every untouched field intact across the
/// rewrite, and the rewrite is tab-indented.
#[test]
fn test_realistic_postman_export_round_trip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let env_path = temp_dir.path().join("env.json");
    fs::write(
        &env_path,
        r#"{
	"id": "7f3c2a90-1111-4222-8333-944445555666",
	"name": "STG-Env",
	"values": [
		{
			"key": "base_url",
			"value": "https://api.stg.example.test",
			"type": "default",
			"enabled": true
		},
		{
			"key": "company_cookie",
			"value": "stale",
			"type": "secret",
			"enabled": true
		}
	],
	"_postman_variable_scope": "environment"
}"#,
    )
    .unwrap();

    update_value(&env_path, "company_cookie", "fresh=1").unwrap();

    let content = fs::read_to_string(&env_path).unwrap();
    assert!(content.contains("\n\t\"values\""), "expected tab indentation");

    let document: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(document["id"].as_str().unwrap().len(), 36);
    assert_eq!(document["name"], "STG-Env");
    assert_eq!(document["_postman_variable_scope"], "environment");
    assert_eq!(document["values"][0]["key"], "base_url");
    assert_eq!(document["values"][0]["value"], "https://api.stg.example.test");
    assert_eq!(document["values"][1]["type"], "secret");
    assert_eq!(document["values"][1]["enabled"], true);
    assert_eq!(document["values"][1]["value"], "fresh=1");
}

/// The target key must pre-exist; a run against a file without it fails
/// without rewriting anything.
#[test]
fn test_missing_target_key_is_fatal_and_leaves_file_untouched() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let env_path = temp_dir.path().join("env.json");
    let original = r#"{"values":[{"key":"base_url","value":"https://api.test"}]}"#;
    fs::write(&env_path, original).unwrap();

    let result = update_value(&env_path, "company_cookie", "anything");

    match result {
        Err(EnvFileError::MissingKey { key, .. }) => assert_eq!(key, "company_cookie"),
        other => panic!("expected MissingKey, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&env_path).unwrap(), original);
}
