use regex::Regex;

/// Title templates the practice's note tooling emits, most specific
/// first. Only the first hit counts, so near-identical phrasings cannot
/// stack.
const TITLE_TEMPLATES: [&str; 5] = [
	"comprehensive clinical progress note for",
	"clinical progress note for",
	"progress note for",
	"therapy session with",
	"session with",
];

// Word separators stay on one line; a header never wraps mid-name.
const NAME_PATTERN: &str = r"(?i)(?:clinical progress note for|progress note for|therapy session with|session with)[ \t]+([A-Za-z][A-Za-z'-]*(?:[ \t]+[A-Za-z][A-Za-z'-]*){0,3})";

/// Does the text match a known template naming this subject?
/// Returns the matched template for the factor detail.
pub fn matches_template(text: &str, full_name: &str) -> Option<&'static str> {
	let name = full_name.trim().to_lowercase();

	if name.is_empty() {
		return None;
	}

	let text = normalize(text).to_lowercase();

	for template in TITLE_TEMPLATES {
		if text.contains(&format!("{template} {name}")) {
			return Some(template);
		}
	}
	if text.contains(&format!("{name}'s therapy session")) {
		return Some("'s therapy session");
	}

	None
}

/// Best-effort subject name extraction from a titled note or document.
/// Low-confidence by construction; callers must never treat it as a
/// sole basis for committing a link.
pub fn extract_name(text: &str) -> Option<String> {
	let normalized = normalize(text);
	let re = Regex::new(NAME_PATTERN).ok()?;
	let capture = re.captures(&normalized)?.get(1)?.as_str();
	// "John Best's Therapy Session" captures through the possessive;
	// cut there first.
	let capture = capture.split("'s").next().unwrap_or(capture);
	let mut words = Vec::new();

	for word in capture.split_whitespace() {
		if word.chars().next().is_some_and(|ch| ch.is_ascii_uppercase()) {
			words.push(word);
		} else {
			break;
		}
	}

	while let Some(last) = words.last() {
		if matches!(last.to_ascii_lowercase().as_str(), "therapy" | "session" | "note" | "notes") {
			words.pop();
		} else {
			break;
		}
	}

	if !(2..=4).contains(&words.len()) {
		return None;
	}

	Some(words.join(" "))
}

fn normalize(text: &str) -> String {
	text.replace('\u{2019}', "'")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn template_matches_subject_name() {
		let title = "Comprehensive Clinical Progress Note for John Best's Therapy Session";

		assert_eq!(
			matches_template(title, "John Best"),
			Some("comprehensive clinical progress note for"),
		);
		assert_eq!(matches_template(title, "Karen Foster"), None);
	}

	#[test]
	fn possessive_template_matches() {
		assert_eq!(
			matches_template("John Best's Therapy Session, July 28", "John Best"),
			Some("'s therapy session"),
		);
	}

	#[test]
	fn extracts_name_before_possessive() {
		let title = "Comprehensive Clinical Progress Note for John Best's Therapy Session";

		assert_eq!(extract_name(title), Some("John Best".to_string()));
	}

	#[test]
	fn extracts_name_and_stops_at_lowercase() {
		assert_eq!(
			extract_name("Session with Karen Foster on Tuesday afternoon"),
			Some("Karen Foster".to_string()),
		);
	}

	#[test]
	fn name_capture_stops_at_line_end() {
		let text = "Clinical Progress Note for Karen Foster\nService date: July 20, 2025";

		assert_eq!(extract_name(text), Some("Karen Foster".to_string()));
	}

	#[test]
	fn rejects_single_word_names() {
		assert_eq!(extract_name("Progress Note for Client"), None);
	}

	#[test]
	fn handles_curly_apostrophes() {
		let title = "Clinical Progress Note for John Best\u{2019}s Therapy Session";

		assert_eq!(extract_name(title), Some("John Best".to_string()));
	}
}
