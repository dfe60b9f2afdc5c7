use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
	DateProximity,
	ContentMatch,
	PatternMatch,
	AiAnalysis,
}
impl FactorKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::DateProximity => "date_proximity",
			Self::ContentMatch => "content_match",
			Self::PatternMatch => "pattern_match",
			Self::AiAnalysis => "ai_analysis",
		}
	}
}

/// One scoring contributor. `value` is the raw heuristic in [0, 1];
/// `weight` is its contribution to the combined confidence.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Factor {
	pub kind: FactorKind,
	pub value: f32,
	pub weight: f32,
	pub detail: String,
}
impl Factor {
	pub fn new(kind: FactorKind, value: f32, config_weight: f32, detail: impl Into<String>) -> Self {
		let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };

		Self { kind, value, weight: config_weight.clamp(0.0, 1.0) * value, detail: detail.into() }
	}
}

pub fn combine(factors: &[Factor]) -> f32 {
	factors.iter().map(|factor| factor.weight).sum::<f32>().clamp(0.0, 1.0)
}

pub fn describe(factors: &[Factor]) -> String {
	let parts: Vec<String> = factors
		.iter()
		.map(|factor| format!("{} {:.2} ({})", factor.kind.as_str(), factor.weight, factor.detail))
		.collect();

	parts.join("; ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn weight_is_value_scaled_by_config_weight() {
		let factor = Factor::new(FactorKind::DateProximity, 0.5, 0.4, "two days out");

		assert!((factor.weight - 0.2).abs() < f32::EPSILON);
	}

	#[test]
	fn combine_clamps_to_one() {
		let factors = vec![
			Factor::new(FactorKind::DateProximity, 1.0, 0.9, "same day"),
			Factor::new(FactorKind::PatternMatch, 1.0, 0.9, "titled note"),
		];

		assert_eq!(combine(&factors), 1.0);
	}

	#[test]
	fn non_finite_values_contribute_nothing() {
		let factor = Factor::new(FactorKind::AiAnalysis, f32::NAN, 0.25, "provider glitch");

		assert_eq!(factor.weight, 0.0);
	}
}
