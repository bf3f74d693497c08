//! CLI command definitions for pset-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for resolved configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// YAML (default)
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Era-aware parameter-set configuration resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a fragments directory (overrides discovery)
    #[arg(short, long, global = true)]
    pub fragments: Option<String>,

    /// Era flag to activate (repeatable, or comma-separated)
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub era: Vec<String>,

    /// Skip the built-in module fragments
    #[arg(long, global = true)]
    pub no_builtin: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve module configurations and print them (default)
    Resolve(ResolveArgs),

    /// List defined modules and registered era modifiers
    List,

    /// Load and resolve everything, reporting errors without printing
    Check,
}

/// Arguments for the resolve subcommand.
#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
    /// Module to resolve (all modules when omitted)
    pub module: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,
}
