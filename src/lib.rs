//! steep - compile template directories into a thread-safe render cache.
//!
//! A [`TemplateCache`](cache::TemplateCache) walks a directory, compiles
//! every file with the configured extension through a pluggable
//! [`Engine`](engine::Engine), and keeps the results keyed by their relative
//! path (`blog/post.html` → `blog/post`). Recompiles replace the cache
//! atomically; lookups and renders can run concurrently from any thread.
//!
//! ```no_run
//! use steep::cache::TemplateCache;
//! use steep::engine::EngineKind;
//! use serde_json::json;
//!
//! let cache = TemplateCache::with_engine_kind(EngineKind::Html);
//! cache.must_compile("templates", &cache.default_options());
//! let page = cache.render_to_string("index", &json!({"user": "tea"})).unwrap();
//! ```

pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;

use cache::TemplateCache;
use cli::{Cli, Commands, RenderArgs};
use config::Config;
use engine::Template;
use error::ExitCode;

/// Run the command described by `cli`.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    config.validate()?;

    match &cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::List(args) => {
            let (cache, _) = compile(&config, args.dir.as_ref())?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for key in cache.keys() {
                writeln!(out, "{key}")?;
            }
        }
        Commands::Check(args) => {
            let (cache, root) = compile(&config, args.dir.as_ref())?;
            println!(
                "{} templates compiled from {} with the {} engine",
                cache.len(),
                root.display(),
                cache.engine().name()
            );
        }
        Commands::Render(args) => render(&config, args)?,
    }

    Ok(ExitCode::Success)
}

/// Build a cache for the configured engine and compile `dir` into it.
fn compile(
    config: &Config,
    dir: Option<&PathBuf>,
) -> anyhow::Result<(TemplateCache<Template>, PathBuf)> {
    let root = dir.cloned().unwrap_or_else(|| config.templates.clone());
    let cache = TemplateCache::with_engine_kind(config.engine_kind()?);
    cache.compile(&root, &config.compile_options()?)?;
    Ok((cache, root))
}

fn render(config: &Config, args: &RenderArgs) -> anyhow::Result<()> {
    let data = render_data(args)?;
    let (cache, _) = compile(config, args.dir.as_ref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cache.render(&mut out, &args.key, &data)?;
    out.flush()?;
    Ok(())
}

/// Parse `--data` or `--data-file`; an empty object when neither is given.
fn render_data(args: &RenderArgs) -> anyhow::Result<serde_json::Value> {
    if let Some(inline) = &args.data {
        return serde_json::from_str(inline).context("--data is not valid JSON");
    }
    if let Some(path) = &args.data_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read data file {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()));
    }
    Ok(serde_json::Value::Object(serde_json::Map::new()))
}
