use std::collections::HashSet;

pub fn tokenize(text: &str, max_terms: usize) -> Vec<String> {
	let mut normalized = String::with_capacity(text.len());

	for ch in text.chars() {
		if ch.is_ascii_alphanumeric() {
			normalized.push(ch.to_ascii_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for token in normalized.split_whitespace() {
		if token.len() < 2 {
			continue;
		}
		if seen.insert(token) {
			out.push(token.to_string());
		}
		if out.len() >= max_terms {
			break;
		}
	}

	out
}

pub fn tokenize_terms(text: &str, max_terms: usize) -> HashSet<String> {
	tokenize(text, max_terms).into_iter().collect()
}

/// Share of `context_tokens` that also occur in `text`.
pub fn overlap_ratio(context_tokens: &[String], text: &str, max_text_terms: usize) -> f32 {
	if context_tokens.is_empty() {
		return 0.0;
	}

	let text_terms = tokenize_terms(text, max_text_terms);

	if text_terms.is_empty() {
		return 0.0;
	}

	let mut matched = 0_usize;

	for token in context_tokens {
		if text_terms.contains(token.as_str()) {
			matched += 1;
		}
	}

	matched as f32 / context_tokens.len() as f32
}

pub fn word_count(text: &str) -> usize {
	text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenize_dedups_and_lowercases() {
		let tokens = tokenize("Session session NOTES, notes!", 10);

		assert_eq!(tokens, vec!["session".to_string(), "notes".to_string()]);
	}

	#[test]
	fn tokenize_drops_single_characters() {
		let tokens = tokenize("a b cd", 10);

		assert_eq!(tokens, vec!["cd".to_string()]);
	}

	#[test]
	fn overlap_counts_context_tokens_found_in_text() {
		let context = tokenize("individual therapy office", 10);
		let ratio = overlap_ratio(&context, "Weekly individual therapy at the downtown office.", 64);

		assert_eq!(ratio, 1.0);
	}

	#[test]
	fn overlap_is_zero_without_common_terms() {
		let context = tokenize("family consult", 10);

		assert_eq!(overlap_ratio(&context, "Completely unrelated content.", 64), 0.0);
	}
}
