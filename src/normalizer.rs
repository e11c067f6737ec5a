//! Turns the line-per-paragraph post dialect into Markdown.
//!
//! Every raw line is its own block unless it belongs to a list or a code fence, while
//! Markdown joins adjacent lines into one paragraph. Blank lines are inserted and
//! collapsed here so the renderer sees the same block structure the author wrote.

use std::sync::LazyLock;

use maud::html;
use regex::Regex;

pub(crate) const CODE_DIRECTIVE: &str = "///code";
pub(crate) const VIDEO_DIRECTIVE: &str = "$youtube ";
const FENCE: &str = "```";

static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+").unwrap());
static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Case-insensitive ASCII prefix test, safe on any UTF-8 input.
pub(crate) fn starts_with_directive(line: &str, directive: &str) -> bool {
    line.len() >= directive.len()
        && line.as_bytes()[..directive.len()].eq_ignore_ascii_case(directive.as_bytes())
}

pub(crate) fn is_code_directive(line: &str) -> bool {
    starts_with_directive(line.trim(), CODE_DIRECTIVE)
}

pub(crate) fn is_fence(line: &str) -> bool {
    line.trim().starts_with(FENCE)
}

/// `- item` or `1. item`, after trimming.
pub(crate) fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("- ") || ORDERED_ITEM.is_match(trimmed)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn open_fence(directive: &str) -> String {
    match directive.find('#') {
        Some(i) if i > 0 && i + 1 < directive.len() => {
            format!("{FENCE}{}", directive[i + 1..].trim())
        }
        _ => FENCE.to_string(),
    }
}

pub(crate) fn render_video_embed(video_id: &str) -> String {
    html! {
        div.video-embed {
            iframe
                src=(format!("https://www.youtube.com/embed/{video_id}"))
                title="YouTube video"
                loading="lazy"
                frameborder="0"
                allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share"
                referrerpolicy="strict-origin-when-cross-origin"
                allowfullscreen {}
        }
    }
    .into()
}

fn video_embed(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if !starts_with_directive(trimmed, VIDEO_DIRECTIVE) {
        return None;
    }
    let video_id = trimmed.split_whitespace().last()?;
    VIDEO_ID
        .is_match(video_id)
        .then(|| render_video_embed(video_id))
}

/// Where the normalizer currently is. A fence remembers whether it interrupted a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Text,
    List,
    Fence { after_list: bool },
}

impl Block {
    fn toggle_fence(self) -> Self {
        match self {
            Block::Text => Block::Fence { after_list: false },
            Block::List => Block::Fence { after_list: true },
            Block::Fence { after_list: true } => Block::List,
            Block::Fence { after_list: false } => Block::Text,
        }
    }
}

/// Rewrites directive lines. Lines inside a fence are left alone, except that any code
/// directive there closes the fence.
fn rewrite_lines(lines: &[&str]) -> Vec<String> {
    let mut in_fence = false;
    lines
        .iter()
        .map(|&line| {
            if is_code_directive(line) {
                let fence = if in_fence {
                    FENCE.to_string()
                } else {
                    open_fence(line.trim())
                };
                in_fence = !in_fence;
                return fence;
            }
            if is_fence(line) {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                return line.to_string();
            }
            video_embed(line).unwrap_or_else(|| line.to_string())
        })
        .collect()
}

fn push_blank(output: &mut Vec<String>) {
    if output.last().map_or(true, |last| !is_blank(last)) {
        output.push(String::new());
    }
}

fn push_separator(output: &mut Vec<String>) {
    if output.last().is_some_and(|last| !is_blank(last)) {
        output.push(String::new());
    }
}

/// Normalizes post body lines into a Markdown document.
pub(crate) fn normalize_body(lines: &[&str]) -> String {
    let lines = rewrite_lines(lines);
    let mut output: Vec<String> = Vec::with_capacity(lines.len() * 2);
    let mut block = Block::Text;

    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            output.push(line.clone());
            block = block.toggle_fence();
            continue;
        }

        if let Block::Fence { .. } = block {
            output.push(line.clone());
            continue;
        }

        if is_blank(line) {
            push_blank(&mut output);
            block = Block::Text;
            continue;
        }

        let list_item = is_list_item(line);
        match (block, list_item) {
            (Block::List, false) | (Block::Text, true) => push_separator(&mut output),
            _ => {}
        }

        output.push(line.clone());

        if list_item {
            block = Block::List;
            continue;
        }
        block = Block::Text;

        let next = lines[i + 1..].iter().find(|l| !is_blank(l));
        if next.is_some_and(|next| !is_fence(next) && !is_list_item(next)) {
            output.push(String::new());
        }
    }

    output.join("\n")
}
