use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub scoring: Scoring,
	#[serde(default)]
	pub reconcile: Reconcile,
	#[serde(default)]
	pub undo: Undo,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub similarity: SimilarityProviderConfig,
}

/// The external AI-analysis contributor. When disabled, scoring proceeds
/// without the ai_analysis factor.
#[derive(Debug, Deserialize)]
pub struct SimilarityProviderConfig {
	pub enabled: bool,
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Scoring {
	/// Confidence at or above which the auto-linker commits without review.
	pub commit_threshold: f32,
	/// Candidates below this floor are not returned at all.
	pub min_confidence: f32,
	pub top_k: u32,
	/// Beyond this gap the date_proximity factor sits at its floor.
	pub date_window_days: f32,
	pub proximity_tau_days: f32,
	pub proximity_floor: f32,
	pub weights: ScoringWeights,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
	pub date_proximity: f32,
	pub content_match: f32,
	pub pattern_match: f32,
	pub ai_analysis: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Reconcile {
	/// Notes per AI-analysis batch; a pause separates batches.
	pub ai_chunk_size: u32,
	pub ai_chunk_pause_ms: u64,
	/// Unlinked notes older than this show up in the recommendations.
	pub stale_after_days: i64,
	/// Worker tick interval.
	pub interval_seconds: u64,
	/// Practices the worker reconciles each tick.
	pub practices: Vec<String>,
	/// Whether the worker may create appointments for matched documents.
	pub auto_create_appointments: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Undo {
	pub window_seconds: u64,
}

impl Default for Scoring {
	fn default() -> Self {
		Self {
			commit_threshold: 0.75,
			min_confidence: 0.1,
			top_k: 5,
			date_window_days: 14.0,
			proximity_tau_days: 3.0,
			proximity_floor: 0.05,
			weights: ScoringWeights::default(),
		}
	}
}

impl Default for ScoringWeights {
	fn default() -> Self {
		Self { date_proximity: 0.35, content_match: 0.15, pattern_match: 0.5, ai_analysis: 0.25 }
	}
}

impl Default for Reconcile {
	fn default() -> Self {
		Self {
			ai_chunk_size: 5,
			ai_chunk_pause_ms: 250,
			stale_after_days: 14,
			interval_seconds: 900,
			practices: Vec::new(),
			auto_create_appointments: false,
		}
	}
}

impl Default for Undo {
	fn default() -> Self {
		Self { window_seconds: 30 }
	}
}
