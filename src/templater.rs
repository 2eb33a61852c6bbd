//! Path templating
//!
//! Collapses variable URL path segments into placeholders so that
//! structurally identical endpoints cluster together:
//! - all-digit segments become `:id`
//! - canonical UUIDs (versions 1-5) become `:uuid`
//! - lowercase slugs of six or more characters become `:slug`

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UUID_PATTERN: Regex = Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$"
    )
    .expect("valid uuid regex");

    static ref SLUG_PATTERN: Regex = Regex::new(r"^[a-z0-9-]{6,}$").expect("valid slug regex");
}

pub const ID_PLACEHOLDER: &str = ":id";
pub const UUID_PLACEHOLDER: &str = ":uuid";
pub const SLUG_PLACEHOLDER: &str = ":slug";

/// Template a URL path, e.g. `/api/users/42` -> `/api/users/:id`.
///
/// Empty segments are dropped, so `//a//` templates to `/a` and an empty
/// path to `/`.
pub fn template_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|seg| !seg.is_empty())
        .map(template_segment)
        .collect();

    format!("/{}", segments.join("/"))
}

fn template_segment(segment: &str) -> &str {
    // Digits first: the slug pattern would also accept them
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        ID_PLACEHOLDER
    } else if UUID_PATTERN.is_match(segment) {
        UUID_PLACEHOLDER
    } else if SLUG_PATTERN.is_match(segment) {
        SLUG_PLACEHOLDER
    } else {
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_segment() {
        assert_eq!(template_path("/api/users/42"), "/api/users/:id");
    }

    #[test]
    fn test_slug_segment() {
        assert_eq!(template_path("/api/posts/abc123"), "/api/posts/:slug");
        assert_eq!(template_path("/blog/hello-world"), "/blog/:slug");
    }

    #[test]
    fn test_uuid_segment() {
        assert_eq!(
            template_path("/api/items/550e8400-e29b-41d4-a716-446655440000"),
            "/api/items/:uuid"
        );
        assert_eq!(
            template_path("/api/items/550E8400-E29B-41D4-A716-446655440000"),
            "/api/items/:uuid"
        );
    }

    #[test]
    fn test_uuid_with_bad_version_falls_through() {
        // Version nibble 0 is not canonical; the lowercase form is still slug-like
        assert_eq!(
            template_path("/x/550e8400-e29b-01d4-a716-446655440000"),
            "/x/:slug"
        );
    }

    #[test]
    fn test_root_and_empty() {
        assert_eq!(template_path("/"), "/");
        assert_eq!(template_path(""), "/");
        assert_eq!(template_path("//api//v1/"), "/api/v1");
    }

    #[test]
    fn test_short_and_mixed_case_segments_kept() {
        assert_eq!(template_path("/api/v1/login"), "/api/v1/login");
        assert_eq!(template_path("/api/Profile/abc"), "/api/Profile/abc");
        assert_eq!(template_path("/js/app.min.js"), "/js/app.min.js");
    }

    #[test]
    fn test_long_lowercase_word_is_slug() {
        // Known limitation of the heuristic: plain words of 6+ chars collapse too
        assert_eq!(template_path("/api/settings"), "/api/:slug");
    }
}
