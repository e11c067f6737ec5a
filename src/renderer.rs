use std::path::Path;

use anyhow::Context;
use handlebars::Handlebars;
use pulldown_cmark::{html, Options, Parser};

pub(crate) const POST_TEMPLATE: &str = "post";
pub(crate) const INDEX_TEMPLATE: &str = "index";

pub(crate) fn generate_renderer(template_dir: &Path) -> anyhow::Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_file(POST_TEMPLATE, template_dir.join("post.hbs"))
        .context("post.hbs")?;
    handlebars
        .register_template_file(INDEX_TEMPLATE, template_dir.join("index.hbs"))
        .context("index.hbs")?;
    handlebars.register_partial(
        "layout",
        std::fs::read_to_string(template_dir.join("layout.hbs")).context("layout.hbs")?,
    )?;

    Ok(handlebars)
}

/// Renders normalized Markdown to an HTML fragment.
pub(crate) fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut body_html = String::new();
    html::push_html(&mut body_html, parser);
    body_html
}
