//! pset-config
//!
//! Loads configuration fragments, applies era modifiers, and prints the
//! resolved module parameter sets.

use anyhow::{Result, bail};
use clap::Parser;
use pset_config::cli::{Cli, Command, OutputFormat, ResolveArgs};
use pset_config::config::{FragmentLoader, FragmentPaths, Registry, ResolvedConfig, builtin};
use std::fs::OpenOptions;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new().create(true).append(true).open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let mut registry = Registry::new();
    if !cli.no_builtin {
        builtin::install(&mut registry)?;
    }

    let paths = match &cli.fragments {
        Some(dir) => FragmentPaths::with_dir(dir),
        None => FragmentPaths::discover(),
    };
    let loader = FragmentLoader::load_with_paths(paths, registry, &cli.era)?;

    match cli.command {
        Some(Command::List) => {
            run_list(loader.registry());
        }
        Some(Command::Check) => {
            let files = loader.loaded_files().len();
            let resolved = loader.into_registry().freeze()?;
            info!(files, modules = resolved.len(), "configuration OK");
            println!("OK: {} modules resolved", resolved.len());
        }
        Some(Command::Resolve(args)) => {
            let resolved = loader.into_registry().freeze()?;
            run_resolve(&resolved, &args)?;
        }
        None => {
            let resolved = loader.into_registry().freeze()?;
            run_resolve(&resolved, &ResolveArgs::default())?;
        }
    }

    Ok(())
}

/// Print module names, option counts, and registered modifiers.
fn run_list(registry: &Registry) {
    println!("modules:");
    for name in registry.module_names() {
        // resolve() cannot fail for names the registry just listed
        let count = registry.resolve(name).map(|p| p.len()).unwrap_or(0);
        println!("  {} ({} options)", name, count);
    }
    println!("modifiers:");
    for modifier in registry.modifiers() {
        let state = if registry.is_era_active(modifier.era()) {
            "active"
        } else {
            "inactive"
        };
        println!(
            "  {} [{}] ({} patches)",
            modifier.era(),
            state,
            modifier.patches().len()
        );
    }
}

/// Print one module, or every module, in the requested format.
fn run_resolve(resolved: &ResolvedConfig, args: &ResolveArgs) -> Result<()> {
    match &args.module {
        Some(module) => match resolved.get(module) {
            Some(pset) => print_value(args.format, &pset)?,
            None => bail!("Module not found: {}", module),
        },
        None => print_value(args.format, resolved)?,
    }
    Ok(())
}

fn print_value<T: serde::Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
