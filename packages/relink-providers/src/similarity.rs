use std::time::Duration as StdDuration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Asks the external analysis service how semantically close a note's
/// content sits to an appointment's context. Returns `None` when the
/// service answered but declined to score the pair.
pub async fn score(
	cfg: &relink_config::SimilarityProviderConfig,
	note_content: &str,
	appointment_context: &str,
) -> Result<Option<f32>> {
	let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"content": note_content,
		"context": appointment_context,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_similarity_response(json)
}

fn parse_similarity_response(json: Value) -> Result<Option<f32>> {
	let raw = json
		.get("similarity")
		.or_else(|| json.get("score"))
		.or_else(|| {
			json.get("results")
				.and_then(|results| results.as_array())
				.and_then(|results| results.first())
				.and_then(|first| first.get("relevance_score").or_else(|| first.get("score")))
		})
		.cloned();
	let Some(raw) = raw else { return Ok(None) };

	if raw.is_null() {
		return Ok(None);
	}

	let score = raw.as_f64().ok_or_else(|| Error::InvalidResponse {
		message: "Similarity score must be numeric.".to_string(),
	})? as f32;

	if !score.is_finite() {
		return Err(Error::InvalidResponse {
			message: "Similarity score must be a finite number.".to_string(),
		});
	}

	Ok(Some(score.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_scalar_similarity() {
		let json = serde_json::json!({ "similarity": 0.82 });

		assert_eq!(parse_similarity_response(json).expect("parse failed"), Some(0.82));
	}

	#[test]
	fn parses_results_array_fallback() {
		let json = serde_json::json!({
			"results": [ { "index": 0, "relevance_score": 0.4 } ]
		});

		assert_eq!(parse_similarity_response(json).expect("parse failed"), Some(0.4));
	}

	#[test]
	fn absent_score_is_none() {
		let json = serde_json::json!({ "model": "clinical-sim-1" });

		assert_eq!(parse_similarity_response(json).expect("parse failed"), None);
	}

	#[test]
	fn null_score_is_none() {
		let json = serde_json::json!({ "similarity": null });

		assert_eq!(parse_similarity_response(json).expect("parse failed"), None);
	}

	#[test]
	fn clamps_out_of_range_scores() {
		let json = serde_json::json!({ "score": 1.7 });

		assert_eq!(parse_similarity_response(json).expect("parse failed"), Some(1.0));
	}

	#[test]
	fn rejects_non_numeric_scores() {
		let json = serde_json::json!({ "similarity": "high" });

		assert!(parse_similarity_response(json).is_err());
	}
}
