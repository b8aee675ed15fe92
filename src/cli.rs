//! Command-line interface definitions for steep.
//!
//! Global options select the engine and matching rules and override the
//! configuration file; subcommands compile a template directory and either
//! list it, check it or render one template.
//!
//! # Example
//!
//! ```bash
//! # List every template key under ./templates
//! steep list
//!
//! # Render one template with inline JSON data
//! steep render blog/post site/views --data '{"title": "Hello"}'
//!
//! # Check a Jinja tree without descending into subdirectories
//! steep --engine jinja --no-recursive check site/views
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::compiler::CollisionPolicy;

/// Compile directories of templates and render them from a cache.
#[derive(Debug, Parser)]
#[command(name = "steep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (replaces steep.toml and the user config)
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Template engine (html, jinja, mustache)
    #[arg(short, long, value_name = "NAME", global = true)]
    pub engine: Option<String>,

    /// Full file extension to compile, e.g. ".html" or ".html.j2"
    #[arg(long = "ext", value_name = "EXT", global = true)]
    pub extension: Option<String>,

    /// Only compile templates directly inside the directory
    #[arg(long, global = true)]
    pub no_recursive: bool,

    /// What to do when two files map to the same key
    #[arg(long, value_enum, value_name = "POLICY", global = true)]
    pub on_collision: Option<CollisionPolicy>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a directory and print its template keys
    List(DirArgs),
    /// Compile a directory and report how many templates it holds
    Check(DirArgs),
    /// Compile a directory and render one template to stdout
    Render(RenderArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments naming a template directory.
#[derive(Debug, Args)]
pub struct DirArgs {
    /// Template directory (defaults to the configured one)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for the render subcommand.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template key, e.g. "index" or "blog/post"
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Template directory (defaults to the configured one)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Render data as a JSON document
    #[arg(short, long, value_name = "JSON", conflicts_with = "data_file")]
    pub data: Option<String>,

    /// Read render data from a JSON file
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}
