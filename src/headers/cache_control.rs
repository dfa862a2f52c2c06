//! `Cache-Control` directive parsing.
//!
//! A response may carry several `Cache-Control` field lines; they are treated
//! as one comma-separated list. Directive names are matched ASCII
//! case-insensitively and arguments (`max-age=60`, `no-cache="Set-Cookie"`)
//! never affect the name match.
//!
//! Field values are parsed from their raw bytes. Bytes above 0x7F (obs-text)
//! are kept lossily and never hide the ASCII structure around them.

use axum::http::{header, HeaderMap};

/// A single parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Lowercased directive name.
    pub name: String,
    /// Raw argument after `=`, with surrounding quotes left intact.
    ///
    /// Exposed so callers can inspect field-name lists such as
    /// `no-cache="Set-Cookie"`; the normalizer itself matches on names only.
    pub argument: Option<String>,
}

/// Parsed view over every `Cache-Control` value on a header map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    directives: Vec<Directive>,
}

impl CacheControl {
    /// Parse all `Cache-Control` field lines in `headers`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let directives = headers
            .get_all(header::CACHE_CONTROL)
            .iter()
            .flat_map(|value| split_directives(&String::from_utf8_lossy(value.as_bytes())))
            .collect();

        Self { directives }
    }

    /// Parse a single field value.
    pub fn parse(value: &str) -> Self {
        Self {
            directives: split_directives(value),
        }
    }

    /// True when no directive was found.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Whether a directive with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.directives
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn no_cache(&self) -> bool {
        self.contains("no-cache")
    }

    pub fn no_store(&self) -> bool {
        self.contains("no-store")
    }

    /// `no-cache` and `no-store` together contradict each other.
    pub fn is_contradictory(&self) -> bool {
        self.no_cache() && self.no_store()
    }
}

/// Split a field value on commas that are not inside a quoted string.
fn split_directives(value: &str) -> Vec<Directive> {
    let mut directives = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                directives.extend(parse_directive(&value[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    directives.extend(parse_directive(&value[start..]));

    directives
}

fn parse_directive(raw: &str) -> Option<Directive> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (name, argument) = match raw.split_once('=') {
        Some((name, arg)) => (name.trim(), Some(arg.trim().to_string())),
        None => (raw, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(Directive {
        name: name.to_ascii_lowercase(),
        argument,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_simple_list() {
        let cc = CacheControl::parse("no-cache, no-store");
        assert!(cc.no_cache());
        assert!(cc.no_store());
        assert!(cc.is_contradictory());
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let cc = CacheControl::parse("No-Cache,NO-STORE");
        assert!(cc.is_contradictory());
        assert_eq!(cc.directives()[0].name, "no-cache");
    }

    #[test]
    fn test_arguments_do_not_affect_name() {
        let cc = CacheControl::parse("private, no-cache=\"Set-Cookie, Vary\", max-age=0");
        assert_eq!(cc.directives().len(), 3);
        assert!(cc.no_cache());
        assert!(!cc.no_store());
        assert_eq!(
            cc.directives()[1].argument.as_deref(),
            Some("\"Set-Cookie, Vary\"")
        );
    }

    #[test]
    fn test_empty_and_stray_commas() {
        assert!(CacheControl::parse("").is_empty());
        assert!(CacheControl::parse(" , ,").is_empty());
        assert_eq!(CacheControl::parse(",public,,").directives().len(), 1);
    }

    #[test]
    fn test_directives_across_field_lines() {
        let mut headers = HeaderMap::new();
        headers.append(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.append(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let cc = CacheControl::from_headers(&headers);
        assert!(cc.is_contradictory());
    }

    #[test]
    fn test_obs_text_does_not_hide_directives() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::CACHE_CONTROL,
            HeaderValue::from_bytes(b"public, max-age=60, ext=\"caf\xc3\xa9\"").unwrap(),
        );

        let cc = CacheControl::from_headers(&headers);
        assert_eq!(cc.directives().len(), 3);
        assert!(cc.contains("public"));
        assert!(cc.contains("ext"));
    }

    #[test]
    fn test_invalid_utf8_line_still_parsed() {
        let mut headers = HeaderMap::new();
        headers.append(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.append(
            header::CACHE_CONTROL,
            HeaderValue::from_bytes(b"no-store, ext=\"\xe9\"").unwrap(),
        );

        let cc = CacheControl::from_headers(&headers);
        assert!(cc.is_contradictory());
        assert_eq!(cc.directives().len(), 3);
    }

    #[test]
    fn test_no_store_inside_quotes_is_not_a_directive() {
        let cc = CacheControl::parse("no-cache=\"no-store\"");
        assert!(cc.no_cache());
        assert!(!cc.no_store());
    }
}
