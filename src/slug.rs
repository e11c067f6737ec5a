use std::sync::LazyLock;

use log::debug;
use regex::Regex;

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\-\s]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Builds the URL slug from the `slug` metadata value, or the file stem when there is none.
pub(crate) fn make_slug(preferred: Option<&str>, fallback: &str) -> String {
    let input = preferred
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback);
    let lowered = input.trim().to_lowercase();

    let slug = DISALLOWED.replace_all(&lowered, "");
    let slug = WHITESPACE.replace_all(&slug, "-");
    let slug = HYPHENS.replace_all(&slug, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        debug!("{input:?} has no usable characters, using {fallback:?} as slug");
        fallback.to_lowercase()
    } else {
        slug.to_string()
    }
}
