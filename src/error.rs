use std::path::PathBuf;

use thiserror::Error;

/// Errors that make a single post impossible to build.
#[derive(Debug, Error)]
pub(crate) enum PostError {
    #[error("missing {field} in post `{}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },
}
