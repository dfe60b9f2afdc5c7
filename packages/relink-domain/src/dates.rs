use regex::Regex;
use time::{Date, Month};

const ISO_PATTERN: &str = r"\b(\d{4})-(\d{2})-(\d{2})\b";
const US_PATTERN: &str = r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b";
const LONG_PATTERN: &str = r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2}),?\s+(\d{4})\b";

/// Pull a service date out of free text. Scanned formats are the ones
/// the practice's documents actually carry: ISO, US numeric, and long
/// month names. The first parseable hit wins.
pub fn extract_service_date(text: &str) -> Option<Date> {
	if let Some(date) = scan_iso(text) {
		return Some(date);
	}
	if let Some(date) = scan_us(text) {
		return Some(date);
	}

	scan_long(text)
}

fn scan_iso(text: &str) -> Option<Date> {
	let re = Regex::new(ISO_PATTERN).ok()?;

	for captures in re.captures_iter(text) {
		let year: i32 = captures.get(1)?.as_str().parse().ok()?;
		let month: u8 = captures.get(2)?.as_str().parse().ok()?;
		let day: u8 = captures.get(3)?.as_str().parse().ok()?;

		if let Some(date) = calendar_date(year, month, day) {
			return Some(date);
		}
	}

	None
}

fn scan_us(text: &str) -> Option<Date> {
	let re = Regex::new(US_PATTERN).ok()?;

	for captures in re.captures_iter(text) {
		let month: u8 = captures.get(1)?.as_str().parse().ok()?;
		let day: u8 = captures.get(2)?.as_str().parse().ok()?;
		let year: i32 = captures.get(3)?.as_str().parse().ok()?;

		if let Some(date) = calendar_date(year, month, day) {
			return Some(date);
		}
	}

	None
}

fn scan_long(text: &str) -> Option<Date> {
	let re = Regex::new(LONG_PATTERN).ok()?;

	for captures in re.captures_iter(text) {
		let month = month_from_name(captures.get(1)?.as_str())?;
		let day: u8 = captures.get(2)?.as_str().parse().ok()?;
		let year: i32 = captures.get(3)?.as_str().parse().ok()?;

		if let Ok(date) = Date::from_calendar_date(year, month, day) {
			return Some(date);
		}
	}

	None
}

fn calendar_date(year: i32, month: u8, day: u8) -> Option<Date> {
	let month = Month::try_from(month).ok()?;

	Date::from_calendar_date(year, month, day).ok()
}

fn month_from_name(name: &str) -> Option<Month> {
	let month = match name.to_ascii_lowercase().as_str() {
		"january" => Month::January,
		"february" => Month::February,
		"march" => Month::March,
		"april" => Month::April,
		"may" => Month::May,
		"june" => Month::June,
		"july" => Month::July,
		"august" => Month::August,
		"september" => Month::September,
		"october" => Month::October,
		"november" => Month::November,
		"december" => Month::December,
		_ => return None,
	};

	Some(month)
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;

	#[test]
	fn extracts_iso_dates() {
		assert_eq!(
			extract_service_date("Seen on 2025-07-28 for follow-up."),
			Some(date!(2025-07-28)),
		);
	}

	#[test]
	fn extracts_us_numeric_dates() {
		assert_eq!(extract_service_date("Session 7/28/2025 at 1000"), Some(date!(2025-07-28)));
		assert_eq!(extract_service_date("Scanned 7-20-2025 batch"), Some(date!(2025-07-20)));
	}

	#[test]
	fn extracts_long_month_dates() {
		assert_eq!(
			extract_service_date("Progress note dated July 20, 2025."),
			Some(date!(2025-07-20)),
		);
	}

	#[test]
	fn skips_impossible_dates() {
		assert_eq!(extract_service_date("Dated 13/45/2025, then June 1, 2025."), Some(date!(2025-06-01)));
	}

	#[test]
	fn returns_none_without_a_date() {
		assert_eq!(extract_service_date("No date anywhere in this text."), None);
	}
}
