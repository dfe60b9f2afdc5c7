const MAX_TOPICS: usize = 10;

/// Keyword map for the topical tags the practice files notes under,
/// used when the external tagging service has not populated them.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
	("CBT", &["cognitive behavioral", "cbt", "cognitive restructuring", "thought record"]),
	("ACT", &["acceptance commitment", "mindfulness", "psychological flexibility"]),
	("DBT", &["dialectical behavior", "dbt", "distress tolerance", "emotion regulation"]),
	("Narrative Therapy", &["narrative", "externalize", "re-authoring", "dominant story"]),
	("Anxiety", &["anxiety", "anxious", "worry", "panic"]),
	("Depression", &["depression", "depressed", "sadness", "hopeless"]),
	("Trauma", &["trauma", "ptsd", "flashback", "triggered"]),
	("Relationship Issues", &["relationship", "partner", "couple", "conflict"]),
	("Family Dynamics", &["family", "parent", "sibling", "family system"]),
	("Coping Skills", &["coping", "strategies", "techniques"]),
	("Homework", &["homework", "assignment", "between sessions"]),
	("Follow-up", &["next session", "follow-up", "continue"]),
	("Progress", &["progress", "improvement", "growth"]),
];

pub fn extract_topics(content: &str) -> Vec<String> {
	let content = content.to_lowercase();
	let mut topics = Vec::new();

	for (topic, keywords) in TOPIC_KEYWORDS {
		if keywords.iter().any(|keyword| content.contains(keyword)) {
			topics.push((*topic).to_string());
		}
		if topics.len() >= MAX_TOPICS {
			break;
		}
	}

	topics
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_keywords_to_topics() {
		let topics = extract_topics(
			"Client reported anxiety around family conflict; assigned a thought record for homework.",
		);

		assert!(topics.contains(&"CBT".to_string()));
		assert!(topics.contains(&"Anxiety".to_string()));
		assert!(topics.contains(&"Family Dynamics".to_string()));
		assert!(topics.contains(&"Homework".to_string()));
	}

	#[test]
	fn empty_content_yields_no_topics() {
		assert!(extract_topics("").is_empty());
	}

	#[test]
	fn caps_the_topic_count() {
		let everything = "cognitive behavioral mindfulness dialectical behavior narrative anxiety \
			depression trauma relationship family coping homework next session progress";

		assert!(extract_topics(everything).len() <= MAX_TOPICS);
	}
}
