mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Postgres, Providers, Reconcile, Scoring, ScoringWeights, Service,
	SimilarityProviderConfig, Storage, Undo,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn normalize(cfg: &mut Config) {
	let similarity = &mut cfg.providers.similarity;

	while similarity.api_base.ends_with('/') {
		similarity.api_base.pop();
	}
	if !similarity.path.is_empty() && !similarity.path.starts_with('/') {
		similarity.path.insert(0, '/');
	}

	for practice in &mut cfg.reconcile.practices {
		*practice = practice.trim().to_string();
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	let similarity = &cfg.providers.similarity;

	if similarity.enabled {
		if similarity.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.similarity.api_base must be non-empty when enabled."
					.to_string(),
			});
		}
		if similarity.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.similarity.api_key must be non-empty when enabled."
					.to_string(),
			});
		}
		if similarity.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.similarity.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	let scoring = &cfg.scoring;

	for (label, weight) in [
		("date_proximity", scoring.weights.date_proximity),
		("content_match", scoring.weights.content_match),
		("pattern_match", scoring.weights.pattern_match),
		("ai_analysis", scoring.weights.ai_analysis),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("scoring.weights.{label} must be a finite number."),
			});
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("scoring.weights.{label} must be in the range 0.0-1.0."),
			});
		}
	}

	let weight_sum = scoring.weights.date_proximity
		+ scoring.weights.content_match
		+ scoring.weights.pattern_match
		+ scoring.weights.ai_analysis;

	if weight_sum <= 0.0 {
		return Err(Error::Validation {
			message: "scoring.weights must not all be zero.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&scoring.commit_threshold) || scoring.commit_threshold == 0.0 {
		return Err(Error::Validation {
			message: "scoring.commit_threshold must be greater than zero and at most 1.0."
				.to_string(),
		});
	}
	if !(0.0..1.0).contains(&scoring.min_confidence) {
		return Err(Error::Validation {
			message: "scoring.min_confidence must be at least zero and below 1.0.".to_string(),
		});
	}
	if scoring.min_confidence >= scoring.commit_threshold {
		return Err(Error::Validation {
			message: "scoring.min_confidence must be below scoring.commit_threshold.".to_string(),
		});
	}
	// Heuristic name extraction must never be the sole basis for an
	// auto-commit.
	if scoring.weights.pattern_match >= scoring.commit_threshold {
		return Err(Error::Validation {
			message: "scoring.weights.pattern_match must be below scoring.commit_threshold."
				.to_string(),
		});
	}
	if scoring.top_k == 0 {
		return Err(Error::Validation {
			message: "scoring.top_k must be greater than zero.".to_string(),
		});
	}
	if !scoring.date_window_days.is_finite() || scoring.date_window_days <= 0.0 {
		return Err(Error::Validation {
			message: "scoring.date_window_days must be greater than zero.".to_string(),
		});
	}
	if !scoring.proximity_tau_days.is_finite() || scoring.proximity_tau_days <= 0.0 {
		return Err(Error::Validation {
			message: "scoring.proximity_tau_days must be greater than zero.".to_string(),
		});
	}
	if !(0.0..1.0).contains(&scoring.proximity_floor) {
		return Err(Error::Validation {
			message: "scoring.proximity_floor must be at least zero and below 1.0.".to_string(),
		});
	}
	if cfg.reconcile.ai_chunk_size == 0 {
		return Err(Error::Validation {
			message: "reconcile.ai_chunk_size must be greater than zero.".to_string(),
		});
	}
	if cfg.reconcile.stale_after_days <= 0 {
		return Err(Error::Validation {
			message: "reconcile.stale_after_days must be greater than zero.".to_string(),
		});
	}
	if cfg.reconcile.interval_seconds == 0 {
		return Err(Error::Validation {
			message: "reconcile.interval_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.undo.window_seconds == 0 {
		return Err(Error::Validation {
			message: "undo.window_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
