//! Identifiers derived from SWAPI resource URLs.
//!
//! `https://swapi.py4e.com/api/people/1/` → id `"1"`, resource type `"people"`.

use regex_lite::Regex;
use std::sync::OnceLock;

fn capture<'a>(re: &'static OnceLock<Option<Regex>>, pattern: &str, url: &'a str) -> &'a str {
    re.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .and_then(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

/// Id of a character (`…/people/<n>/`), empty when `url` is not a people URL.
pub fn character_id(url: &str) -> &str {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    capture(&RE, r"/people/(\d+)/", url)
}

/// Trailing numeric segment of any resource URL.
pub fn extract_id(url: &str) -> &str {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    capture(&RE, r"/(\d+)/?$", url)
}

/// Resource collection name (`planets`, `films`, ...).
pub fn extract_resource_type(url: &str) -> &str {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    capture(&RE, r"/api/(\w+)/", url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_id_from_people_url() {
        assert_eq!(character_id("https://swapi.py4e.com/api/people/1/"), "1");
        assert_eq!(character_id("https://swapi.py4e.com/api/people/42/"), "42");
        assert_eq!(character_id("https://swapi.py4e.com/api/planets/1/"), "");
        assert_eq!(character_id("not a url"), "");
    }

    #[test]
    fn extract_id_accepts_missing_trailing_slash() {
        assert_eq!(extract_id("https://swapi.py4e.com/api/planets/1/"), "1");
        assert_eq!(extract_id("https://swapi.py4e.com/api/films/6"), "6");
        assert_eq!(extract_id("https://swapi.py4e.com/api/films/"), "");
    }

    #[test]
    fn resource_type_from_url() {
        assert_eq!(
            extract_resource_type("https://swapi.py4e.com/api/planets/1/"),
            "planets"
        );
        assert_eq!(extract_resource_type("https://example.com/other/1/"), "");
    }
}
