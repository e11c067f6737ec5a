use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::NaiveDate;
use fs_extra::dir::CopyOptions;
use handlebars::Handlebars;
use log::{debug, info, warn};

use crate::{
    config::Config,
    metadata::read_front_matter,
    normalizer::normalize_body,
    renderer::{render_markdown, INDEX_TEMPLATE, POST_TEMPLATE},
    slug::make_slug,
    summary::summarize,
};

mod data;
mod utils;

use data::{IndexEntry, IndexPageData, Post, PostPageData, RawPost};
use utils::{parse_date, sort_post};

fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect()
}

/// Runs one post file through the whole pipeline.
pub(crate) fn parse_post(raw: &RawPost) -> anyhow::Result<Post> {
    let lines = split_lines(&raw.content);
    let front = read_front_matter(&lines, &raw.path)?;
    let body = &lines[front.body_start..];

    let html_body = render_markdown(&normalize_body(body));
    let slug = make_slug(front.metadata.value("slug"), &raw.slug_candidate);
    let explicit_summary = front
        .metadata
        .value("summary")
        .or_else(|| front.metadata.value("description"));
    let description = summarize(explicit_summary, body, &front.title);

    let (date_display, date_sort) = match parse_date(&front.date) {
        Some(date) => (date.format("%Y-%m-%d").to_string(), date),
        None => {
            warn!(
                "Could not parse date {:?} in {:?}. it will be listed last.",
                front.date, raw.path
            );
            (front.date.clone(), NaiveDate::MIN)
        }
    };
    debug!("{:?} -> {slug} ({date_display})", raw.path);

    Ok(Post {
        slug,
        title: front.title,
        description,
        date_machine: date_display.clone(),
        date_display,
        date_sort,
        html_body,
    })
}

/// Post files in `config.input_dir`, ordered by file name ignoring case.
fn collect_post_files(config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in std::fs::read_dir(&config.input_dir)
        .with_context(|| format!("while listing {:?}", config.input_dir))?
    {
        let entry = entry?;
        let path = entry.path();
        let matches_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&config.extension));
        if entry.metadata()?.is_file() && matches_extension {
            files.push(path);
        }
    }
    files.sort_by_key(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()));
    Ok(files)
}

fn read_post(path: &Path) -> anyhow::Result<RawPost> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("while reading {path:?}"))?;
    let slug_candidate = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(RawPost {
        path: path.to_path_buf(),
        slug_candidate,
        content,
    })
}

fn create_output(path: &Path) -> anyhow::Result<BufWriter<std::fs::File>> {
    let fd = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("while opening {path:?}"))?;
    Ok(BufWriter::new(fd))
}

fn write_post(config: &Config, handlebars: &Handlebars, post: &Post) -> anyhow::Result<()> {
    let out_path = config.post_out_dir().join(format!("{}.html", post.slug));
    info!("Writing {out_path:?}");

    let data = PostPageData {
        site_name: &config.site_name,
        root: config.post_root(),
        body: &post.html_body,
        post,
    };
    let mut writer = create_output(&out_path)?;
    handlebars
        .render_to_write(POST_TEMPLATE, &data, &mut writer)
        .with_context(|| format!("while generating {out_path:?}"))?;
    writer.flush()?;
    Ok(())
}

fn write_index(config: &Config, handlebars: &Handlebars, posts: &[Post]) -> anyhow::Result<()> {
    let index_path = config.index_path();
    info!("Writing {index_path:?}");

    let data = IndexPageData {
        site_name: &config.site_name,
        posts: posts
            .iter()
            .map(|post| IndexEntry {
                href: config.post_href(&post.slug),
                post,
            })
            .collect(),
    };
    let mut writer = create_output(&index_path)?;
    handlebars
        .render_to_write(INDEX_TEMPLATE, &data, &mut writer)
        .context("while generating index.html")?;
    writer.flush()?;
    Ok(())
}

/// Reads every post, then writes the post pages and the index.
///
/// Any post that fails to parse stops the build before anything is written.
pub(crate) fn generate(config: &Config, handlebars: &Handlebars) -> anyhow::Result<Vec<Post>> {
    let mut posts = vec![];
    for path in collect_post_files(config)? {
        info!("Reading {path:?}");
        let raw = read_post(&path)?;
        posts.push(parse_post(&raw).with_context(|| format!("while preprocessing {path:?}"))?);
    }
    posts.sort_by(sort_post);

    fs_extra::dir::create_all(config.post_out_dir(), false)?;
    if let Some(public_dir) = &config.public_dir {
        let mut cp_opts = CopyOptions::new();
        cp_opts.copy_inside = true;
        cp_opts.content_only = true;
        cp_opts.overwrite = true;
        fs_extra::dir::copy(public_dir, &config.out_dir, &cp_opts)
            .with_context(|| format!("while copying {public_dir:?}"))?;
    }

    for post in posts.iter() {
        write_post(config, handlebars, post)?;
    }
    write_index(config, handlebars, &posts)?;

    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::PostError, renderer::generate_renderer};
    use tempfile::TempDir;

    fn raw(name: &str, content: &str) -> RawPost {
        RawPost {
            path: PathBuf::from(format!("raw/{name}.txt")),
            slug_candidate: name.to_string(),
            content: content.to_string(),
        }
    }

    fn config(root: &Path) -> Config {
        Config {
            input_dir: root.join("raw"),
            out_dir: root.join("site"),
            post_dir: "blog".to_string(),
            template_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("template"),
            public_dir: None,
            extension: "txt".to_string(),
            site_name: "Test & Co".to_string(),
        }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_parse_structured_post() {
        let post = parse_post(&raw(
            "ignored",
            "title: Hello <World>\r\ndate: 2024-03-15 08:00\r\nslug: Hello World!\r\n\r\nFirst line.\r\nSecond line.\r\n",
        ))
        .unwrap();
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.title, "Hello <World>");
        assert_eq!(post.description, "First line.");
        assert_eq!(post.date_display, "2024-03-15");
        assert_eq!(post.date_machine, "2024-03-15");
        assert_eq!(post.date_sort, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(post.html_body, "<p>First line.</p>\n<p>Second line.</p>\n");
    }

    #[test]
    fn test_parse_legacy_post() {
        let post = parse_post(&raw(
            "My Legacy Post",
            "My legacy post\n03/15/2024\n\n- one\n- two\nAfter the list.",
        ))
        .unwrap();
        assert_eq!(post.slug, "my-legacy-post");
        assert_eq!(post.title, "My legacy post");
        assert_eq!(post.description, "After the list.");
        assert_eq!(post.date_machine, "2024-03-15");
        assert!(post.html_body.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<p>After the list.</p>"));
    }

    #[test]
    fn test_unparseable_date_falls_back_to_raw_text() {
        let post = parse_post(&raw("p", "title: T\ndate:   around new year  \n\nBody")).unwrap();
        assert_eq!(post.date_display, "around new year");
        assert_eq!(post.date_machine, "around new year");
        assert_eq!(post.date_sort, NaiveDate::MIN);
    }

    #[test]
    fn test_explicit_summary_and_description_alias() {
        let post = parse_post(&raw("p", "title: T\ndate: 2024-01-01\nsummary: Sum\n\nBody")).unwrap();
        assert_eq!(post.description, "Sum");
        let post =
            parse_post(&raw("p", "title: T\ndate: 2024-01-01\ndescription: Desc\n\nBody")).unwrap();
        assert_eq!(post.description, "Desc");
    }

    #[test]
    fn test_missing_field_is_typed() {
        let err = parse_post(&raw("p", "title: T\n\nBody")).unwrap_err();
        let err = err.downcast_ref::<PostError>().unwrap();
        assert!(matches!(err, PostError::MissingField { field: "date", .. }));
    }

    #[test]
    fn test_generate_site() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        write(
            &config.input_dir,
            "b-second.txt",
            "title: Second & last\ndate: 2024-02-01\n\nWatch this:\n$youtube dQw4w9WgXcQ\n",
        );
        write(
            &config.input_dir,
            "A-first.TXT",
            "First post\n2024-01-01\n\n///code#rust\nfn main() {}\n///code\nHello <b>there</b>.",
        );
        write(&config.input_dir, "notes.md", "not a post");

        let handlebars = generate_renderer(&config.template_dir).unwrap();
        let posts = generate(&config, &handlebars).unwrap();

        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["b-second", "a-first"]);

        let second = std::fs::read_to_string(config.post_out_dir().join("b-second.html")).unwrap();
        assert!(second.contains("Second &amp; last"));
        assert!(second.contains("https://www.youtube.com/embed/dQw4w9WgXcQ"));
        assert!(second.contains("datetime=\"2024-02-01\""));

        let first = std::fs::read_to_string(config.post_out_dir().join("a-first.html")).unwrap();
        assert!(first.contains("<code class=\"language-rust\">fn main() {}"));
        assert!(first.contains("Hello <b>there</b>."));
        assert!(first.contains("content=\"Hello there.\""));

        let index = std::fs::read_to_string(config.index_path()).unwrap();
        let second_at = index.find("href=\"blog/b-second.html\"").unwrap();
        let first_at = index.find("href=\"blog/a-first.html\"").unwrap();
        assert!(second_at < first_at);
        assert!(index.contains("Test &amp; Co"));
        assert!(!config.post_out_dir().join("notes.html").exists());
    }

    #[test]
    fn test_generate_overwrites_output() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        write(&config.input_dir, "p.txt", "title: T\ndate: 2024-01-01\n\nShort.");
        write(&config.post_out_dir(), "p.html", &"stale ".repeat(10_000));

        let handlebars = generate_renderer(&config.template_dir).unwrap();
        generate(&config, &handlebars).unwrap();

        let page = std::fs::read_to_string(config.post_out_dir().join("p.html")).unwrap();
        assert!(!page.contains("stale"));
    }

    #[test]
    fn test_generate_copies_public_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path());
        let public_dir = dir.path().join("public");
        write(&public_dir.join("css"), "site.css", "body {}");
        config.public_dir = Some(public_dir);
        write(&config.input_dir, "p.txt", "title: T\ndate: 2024-01-01\n\nShort.");

        let handlebars = generate_renderer(&config.template_dir).unwrap();
        generate(&config, &handlebars).unwrap();

        assert!(config.out_dir.join("css").join("site.css").exists());
    }

    #[test]
    fn test_nested_post_dir_links_back_to_root() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path());
        config.post_dir = "posts/2024".to_string();
        write(&config.input_dir, "p.txt", "title: T\ndate: 2024-01-01\n\nShort.");

        let handlebars = generate_renderer(&config.template_dir).unwrap();
        generate(&config, &handlebars).unwrap();

        let page = std::fs::read_to_string(config.post_out_dir().join("p.html")).unwrap();
        assert!(page.contains("href=\"../../css/site.css\""));
        assert!(page.contains("href=\"../../index.html\""));
        let index = std::fs::read_to_string(config.index_path()).unwrap();
        assert!(index.contains("href=\"posts/2024/p.html\""));
    }

    #[test]
    fn test_missing_field_stops_the_build() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        write(&config.input_dir, "a.txt", "title: T\ndate: 2024-01-01\n\nFine.");
        write(&config.input_dir, "b.txt", "Only a title");

        let handlebars = generate_renderer(&config.template_dir).unwrap();
        let err = generate(&config, &handlebars).unwrap_err();
        assert!(err.chain().any(|e| e.to_string().contains("missing date")));
        assert!(!config.index_path().exists());
        assert!(!config.post_out_dir().join("t.html").exists());
    }
}
