use std::path::{Component, Path, PathBuf};

/// Where posts come from and where the site goes.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub input_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Sub-directory of `out_dir` holding one page per post.
    pub post_dir: String,
    pub template_dir: PathBuf,
    pub public_dir: Option<PathBuf>,

    /// Extension of post files, without the dot.
    pub extension: String,
    pub site_name: String,
}

impl Config {
    pub fn post_out_dir(&self) -> PathBuf {
        self.out_dir.join(&self.post_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.out_dir.join("index.html")
    }

    /// Relative path from a post page back to `out_dir`.
    pub fn post_root(&self) -> String {
        let depth = Path::new(&self.post_dir)
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count();
        "../".repeat(depth)
    }

    /// Link from the index page to a post.
    pub fn post_href(&self, slug: &str) -> String {
        format!("{}/{slug}.html", self.post_dir)
    }
}
