use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

/// A post file as read from disk.
#[derive(Debug)]
pub(crate) struct RawPost {
    pub path: PathBuf,
    /// File stem, used when the post sets no slug.
    pub slug_candidate: String,
    pub content: String,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct Post {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date_display: String,
    pub date_machine: String,

    #[serde(skip_serializing)]
    pub date_sort: NaiveDate,
    #[serde(skip_serializing)]
    pub html_body: String,
}

#[derive(Serialize, Debug)]
pub(super) struct PostPageData<'a> {
    pub site_name: &'a str,
    /// Relative path from the post page to the site root.
    pub root: String,
    pub body: &'a str,
    pub post: &'a Post,
}

#[derive(Serialize, Debug)]
pub(super) struct IndexEntry<'a> {
    pub href: String,
    #[serde(flatten)]
    pub post: &'a Post,
}

#[derive(Serialize, Debug)]
pub(super) struct IndexPageData<'a> {
    pub site_name: &'a str,
    pub posts: Vec<IndexEntry<'a>>,
}
