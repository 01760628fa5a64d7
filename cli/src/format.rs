//! Display formatting for SWAPI values.

use chrono::DateTime;

/// Render a raw SWAPI value, translating its placeholder words.
pub fn format_field(value: &str, unit: Option<&str>) -> String {
    match value {
        "" | "unknown" => "Not recorded".to_string(),
        "n/a" => "N/A".to_string(),
        "none" => "None".to_string(),
        _ => match unit {
            Some(unit) => format!("{value} {unit}"),
            None => value.to_string(),
        },
    }
}

/// `2014-12-09T13:50:51.644000Z` → `December 9, 2014`. Unparsable input is
/// returned as is.
pub fn format_date(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Count of related resources, `None` for an empty list.
pub fn format_count(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.len().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_words_are_translated() {
        assert_eq!(format_field("unknown", Some("cm")), "Not recorded");
        assert_eq!(format_field("", None), "Not recorded");
        assert_eq!(format_field("n/a", None), "N/A");
        assert_eq!(format_field("none", None), "None");
    }

    #[test]
    fn unit_is_appended_to_real_values() {
        assert_eq!(format_field("172", Some("cm")), "172 cm");
        assert_eq!(format_field("blond", None), "blond");
    }

    #[test]
    fn dates_are_humanized() {
        assert_eq!(format_date("2014-12-09T13:50:51.644000Z"), "December 9, 2014");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn counts() {
        assert_eq!(format_count(&[]), "None");
        assert_eq!(format_count(&["a".to_string(), "b".to_string()]), "2");
    }
}
