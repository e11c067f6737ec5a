use std::{collections::HashMap, path::Path};

use log::debug;

use crate::error::PostError;

/// Front matter of a post. Keys are case-insensitive.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Metadata(HashMap<String, String>);

impl Metadata {
    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_lowercase(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Value of `key`, unless it is missing or blank.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of scanning the top of a post. The index is where the remaining text starts.
#[derive(Debug, PartialEq)]
pub(crate) enum Header {
    Structured(Metadata, usize),
    Legacy(usize),
}

/// Scans `key: value` lines up to the first blank line.
///
/// A single line without a usable key throws the whole header away and the post is
/// read from the top in the legacy title/date layout.
pub(crate) fn parse_header(lines: &[&str]) -> Header {
    let mut metadata = Metadata::default();
    let mut cursor = 0;

    while cursor < lines.len() {
        let line = lines[cursor];
        cursor += 1;

        if line.trim().is_empty() {
            break;
        }

        match line.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                metadata.insert(key.trim(), value.trim());
            }
            _ => return Header::Legacy(0),
        }
    }

    if metadata.is_empty() {
        Header::Legacy(cursor)
    } else {
        Header::Structured(metadata, cursor)
    }
}

/// Everything the pipeline needs from the header of a post.
#[derive(Debug)]
pub(crate) struct FrontMatter {
    pub metadata: Metadata,
    pub title: String,
    pub date: String,
    /// First body line, leading blank lines already skipped.
    pub body_start: usize,
}

pub(crate) fn read_front_matter(lines: &[&str], path: &Path) -> Result<FrontMatter, PostError> {
    let (metadata, title, date, mut cursor) = match parse_header(lines) {
        Header::Structured(metadata, cursor) => {
            let title = metadata.get("title").unwrap_or_default().trim().to_string();
            let date = metadata.get("date").unwrap_or_default().trim().to_string();
            (metadata, title, date, cursor)
        }
        Header::Legacy(mut cursor) => {
            debug!("{path:?} has no metadata block, reading legacy title/date lines");
            let title = next_non_empty_line(lines, &mut cursor).to_string();
            let date = next_non_empty_line(lines, &mut cursor).to_string();
            (Metadata::default(), title, date, cursor)
        }
    };

    if title.is_empty() {
        return Err(PostError::MissingField {
            path: path.to_path_buf(),
            field: "title",
        });
    }
    if date.is_empty() {
        return Err(PostError::MissingField {
            path: path.to_path_buf(),
            field: "date",
        });
    }

    while cursor < lines.len() && lines[cursor].trim().is_empty() {
        cursor += 1;
    }

    Ok(FrontMatter {
        metadata,
        title,
        date,
        body_start: cursor,
    })
}

fn next_non_empty_line<'a>(lines: &[&'a str], cursor: &mut usize) -> &'a str {
    while *cursor < lines.len() {
        let line = lines[*cursor].trim();
        *cursor += 1;
        if !line.is_empty() {
            return line;
        }
    }
    ""
}
