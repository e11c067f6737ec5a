use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::normalizer::{
    is_code_directive, is_fence, is_list_item, starts_with_directive, VIDEO_DIRECTIVE,
};

pub(crate) const MAX_DESCRIPTION_CHARS: usize = 170;
const TRUNCATED_CHARS: usize = 167;
const ELLIPSIS: &str = "...";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

/// Cuts `text` down to a page description, ending it with an ellipsis when shortened.
fn truncate(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > MAX_DESCRIPTION_CHARS {
        let cut: String = text.chars().take(TRUNCATED_CHARS).collect();
        format!("{}{ELLIPSIS}", cut.trim_end())
    } else {
        text.to_string()
    }
}

/// Strips inline tags and shortens `text` to a page description.
pub(crate) fn clean_excerpt(text: &str) -> String {
    truncate(&TAG.replace_all(text, ""))
}

/// First line of plain prose in the raw body, skipping code, embeds and list items.
fn first_prose_line<'a>(body: &[&'a str]) -> Option<&'a str> {
    let mut in_fence = false;
    for &line in body {
        let trimmed = line.trim();
        if is_code_directive(trimmed) || is_fence(trimmed) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence
            || trimmed.is_empty()
            || starts_with_directive(trimmed, VIDEO_DIRECTIVE)
            || is_list_item(trimmed)
        {
            continue;
        }
        return Some(trimmed);
    }
    None
}

/// Description of a post: the explicit one if given, else an excerpt of the body,
/// else the title.
pub(crate) fn summarize(explicit: Option<&str>, body: &[&str], title: &str) -> String {
    let excerpt = match explicit {
        Some(summary) => clean_excerpt(summary),
        None => first_prose_line(body).map(clean_excerpt).unwrap_or_default(),
    };

    if excerpt.is_empty() {
        debug!("no usable summary for {title:?}, using the title");
        truncate(title)
    } else {
        excerpt
    }
}
