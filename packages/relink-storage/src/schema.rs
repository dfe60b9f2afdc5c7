pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_subjects.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_subjects.sql")),
				"tables/002_appointments.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_appointments.sql")),
				"tables/003_notes.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_notes.sql")),
				"tables/004_documents.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_documents.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expands_every_include() {
		let rendered = render_schema();

		assert!(!rendered.contains("\\ir "));
		assert!(rendered.contains("CREATE TABLE IF NOT EXISTS subjects"));
		assert!(rendered.contains("CREATE TABLE IF NOT EXISTS appointments"));
		assert!(rendered.contains("CREATE TABLE IF NOT EXISTS notes"));
		assert!(rendered.contains("CREATE TABLE IF NOT EXISTS documents"));
	}
}
