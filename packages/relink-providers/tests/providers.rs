use serde_json::{Map, Value};

#[test]
fn auth_headers_carry_bearer_token() {
	let headers = relink_providers::auth_headers("secret", &Map::new())
		.expect("Failed to build headers.");

	assert_eq!(headers.get("authorization").and_then(|v| v.to_str().ok()), Some("Bearer secret"));
}

#[test]
fn auth_headers_include_configured_defaults() {
	let mut defaults = Map::new();

	defaults.insert("x-practice".to_string(), Value::String("main".to_string()));

	let headers =
		relink_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");

	assert_eq!(headers.get("x-practice").and_then(|v| v.to_str().ok()), Some("main"));
}

#[test]
fn auth_headers_reject_non_string_defaults() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), Value::Number(3.into()));

	assert!(relink_providers::auth_headers("secret", &defaults).is_err());
}
