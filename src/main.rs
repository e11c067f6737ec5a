use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{command, value_parser, Arg, ArgMatches};
use config::Config;
use env_logger::Env;
use generator::generate;
use log::info;
use renderer::generate_renderer;

mod config;
mod error;
mod generator;
mod metadata;
mod normalizer;
mod renderer;
mod slug;
mod summary;

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> anyhow::Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .with_context(|| format!("{id} is not given"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = command!()
        .args([
            Arg::new("input_dir")
                .help("Directory path of posts")
                .value_parser(value_parser!(PathBuf))
                .default_value("raw"),
            Arg::new("out_dir")
                .help("Directory path of output. Existing pages with the same name are overwritten.")
                .value_parser(value_parser!(PathBuf))
                .default_value("wwwroot"),
            Arg::new("template_dir")
                .long("template-dir")
                .help("Directory of template (post.hbs, index.hbs, layout.hbs)")
                .value_parser(value_parser!(PathBuf))
                .default_value("template"),
            Arg::new("public_dir")
                .long("public-dir")
                .help("Directory path of public. Contents will be copied as it is.")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("post_dir")
                .long("post-dir")
                .help("Sub-directory of out_dir for post pages")
                .default_value("blog"),
            Arg::new("extension")
                .long("extension")
                .help("Extension of post files")
                .default_value("txt"),
        ])
        .get_matches();

    let input_dir: PathBuf = required(&matches, "input_dir")?;
    if !input_dir.is_dir() {
        bail!("input_dir must be a directory.");
    }
    let out_dir: PathBuf = required(&matches, "out_dir")?;
    if out_dir.exists() && !out_dir.is_dir() {
        bail!("if out_dir exists, it must be directory.");
    }
    let template_dir: PathBuf = required(&matches, "template_dir")?;
    if !template_dir.is_dir() {
        bail!("template_dir must be a directory.")
    }
    let public_dir = matches.get_one::<PathBuf>("public_dir").cloned();
    if public_dir.as_ref().is_some_and(|p| !p.is_dir()) {
        bail!("public_dir must be a directory.")
    }

    let config = Config {
        input_dir,
        out_dir,
        post_dir: required(&matches, "post_dir")?,
        template_dir,
        public_dir,
        extension: required::<String>(&matches, "extension")?
            .trim_start_matches('.')
            .to_string(),
        site_name: std::env::var("BLOG_NAME").unwrap_or_default(),
    };

    let handlebars = generate_renderer(&config.template_dir)?;
    let posts = generate(&config, &handlebars)?;
    info!("Generated {} posts into {:?}", posts.len(), config.out_dir);

    Ok(())
}
