// SPDX-License-Identifier: MIT OR Apache-2.0

mod config;

use std::{fs, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use libmediawiki_updater::{
    ComponentKind, Configuration, Error, JsonOutput, UpdateOptions, UpdateSummary, Verbosity,
    list_components, list_core_versions, update,
};
use serde::Serialize;

use crate::config::CliConfig;

mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const PARTIAL_FAILURE: i32 = 1;
    pub const FATAL_ERROR: i32 = 2;
}

mod ansi {
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";

    #[inline]
    pub fn bold(s: &str) -> String {
        format!("{BOLD}{s}{RESET}")
    }
}

#[derive(Parser)]
#[command(name = "mediawiki-updater")]
#[command(about = "install or refresh a mediawiki core with its extensions and skins")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    update: UpdateArgs,

    /// enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// only report warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// open configuration file in editor
    #[arg(long)]
    edit_config: bool,
}

#[derive(Args, Clone, Debug)]
struct UpdateArgs {
    /// wiki manifest listing the core version, extensions and skins
    #[arg(short, long, default_value = "config.ini")]
    config: PathBuf,

    /// wiki directory to update
    #[arg(short, long, default_value = ".")]
    target: PathBuf,

    /// extra path inside the target to leave untouched (repeatable)
    #[arg(long = "ignore", value_name = "PATH")]
    ignore: Vec<String>,

    /// exit with status 1 when any extension or skin failed
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// download the configured release and merge it into the target
    Update(UpdateArgs),
    /// list what the release index and catalogs offer
    List {
        #[arg(value_enum)]
        what: ListTarget,

        /// output results as json
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListTarget {
    Versions,
    Extensions,
    Skins,
}

fn main() {
    let cli = Cli::parse();

    if cli.edit_config {
        if let Err(e) = CliConfig::edit_config() {
            output_error(false, &e.to_string());
            std::process::exit(exit_codes::FATAL_ERROR);
        }
        return;
    }

    let json = matches!(cli.command, Some(Commands::List { json: true, .. }));

    let config = match CliConfig::load() {
        Ok(c) => c,
        Err(e) => {
            output_error(json, &format!("failed to load config: {e}"));
            std::process::exit(exit_codes::FATAL_ERROR);
        }
    };

    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        config.verbosity
    };
    init_logging(verbosity);

    let result = match &cli.command {
        None => cmd_update(&cli.update, &config, verbosity),
        Some(Commands::Update(args)) => cmd_update(args, &config, verbosity),
        Some(Commands::List { what, json }) => cmd_list(*what, *json, &config, verbosity),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output_error(json, &error_chain(&e));
            std::process::exit(exit_codes::FATAL_ERROR);
        }
    }
}

/// `RUST_LOG` takes precedence over the verbosity flags.
fn init_logging(verbosity: Verbosity) {
    env_logger::Builder::new()
        .filter_level(verbosity.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn error_chain(error: &Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);

    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(&format!("\n  caused by: {text}"));
        }
        source = cause.source();
    }

    message
}

fn output_error(json: bool, msg: &str) {
    if json {
        let output: JsonOutput<()> = JsonOutput::err(msg);
        match serde_json::to_string(&output) {
            Ok(line) => println!("{line}"),
            Err(_) => eprintln!("{} {msg}", ansi::bold("error:")),
        }
    } else {
        eprintln!("{} {msg}", ansi::bold("error:"));
    }
}

fn print_json<T: Serialize>(data: T) -> Result<(), Error> {
    let output = JsonOutput::ok(data);
    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::other(format!("failed to serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

fn cmd_update(args: &UpdateArgs, config: &CliConfig, verbosity: Verbosity) -> Result<i32, Error> {
    if !args.config.is_file() {
        return Err(Error::other(format!(
            "config file not found: {}",
            args.config.display()
        )));
    }

    let manifest = Configuration::load(&args.config)?;

    fs::create_dir_all(&args.target)?;
    let target = args.target.canonicalize()?;

    let mut options: UpdateOptions = config.inner.clone().with_verbosity(verbosity);
    options.ignore.extend(&args.ignore);

    if verbosity != Verbosity::Quiet {
        println!(
            "{} mediawiki {} into {}",
            ansi::bold("update:"),
            manifest.core.version,
            target.display()
        );
    }

    let summary = update(&manifest, &target, &options)?;
    print_summary(&summary, verbosity);

    Ok(update_exit_code(&summary, args.strict))
}

/// add-on failures are reported in the summary; the run itself only fails
/// on them under `--strict`.
fn update_exit_code(summary: &UpdateSummary, strict: bool) -> i32 {
    if strict && summary.has_failures() {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::SUCCESS
    }
}

fn print_summary(summary: &UpdateSummary, verbosity: Verbosity) {
    if verbosity == Verbosity::Quiet {
        if summary.has_failures() {
            for (kind, name, reason) in &summary.failed {
                eprintln!("{} {kind} {name}: {reason}", ansi::bold("failed:"));
            }
        }
        return;
    }

    println!();
    println!(
        "{} mediawiki {}, {} component(s) installed, {} failed",
        ansi::bold("summary:"),
        summary.core_version,
        summary.succeeded.len(),
        summary.failed.len()
    );

    if verbosity == Verbosity::Verbose {
        println!(
            "{} {} files, {} directories copied, {} paths kept",
            ansi::bold("merge:"),
            summary.merged.files,
            summary.merged.directories,
            summary.merged.ignored
        );
    }

    if !summary.succeeded.is_empty() {
        println!();
        println!("{}", ansi::bold("installed:"));
        for (kind, name) in &summary.succeeded {
            println!("  - {kind} {name}");
        }
    }

    if summary.has_failures() {
        println!();
        println!("{}", ansi::bold("failures:"));
        for (kind, name, reason) in &summary.failed {
            println!("  - {kind} {name}: {reason}");
        }
    }
}

fn cmd_list(
    what: ListTarget,
    json: bool,
    config: &CliConfig,
    verbosity: Verbosity,
) -> Result<i32, Error> {
    let kind = match what {
        ListTarget::Versions => {
            let versions = list_core_versions(config)?;

            if json {
                print_json(&versions)?;
            } else if verbosity == Verbosity::Quiet {
                println!("{}", versions.len());
            } else {
                for version in &versions {
                    println!("{version}");
                }
            }
            return Ok(exit_codes::SUCCESS);
        }
        ListTarget::Extensions => ComponentKind::Extension,
        ListTarget::Skins => ComponentKind::Skin,
    };

    let components = list_components(kind, config)?;

    if json {
        print_json(&components)?;
        return Ok(exit_codes::SUCCESS);
    }

    if components.is_empty() {
        if verbosity != Verbosity::Quiet {
            println!("{} no {}s published", ansi::bold("info:"), kind);
        }
        return Ok(exit_codes::SUCCESS);
    }

    if verbosity == Verbosity::Quiet {
        println!("{}", components.len());
        return Ok(exit_codes::SUCCESS);
    }

    let name_width = components.keys().map(String::len).max().unwrap_or(10).max(10);
    println!("{:<name_width$}  VERSIONS", "NAME");
    println!("{}", "-".repeat(name_width + 10));

    for (name, versions) in &components {
        let versions: Vec<&str> = versions.iter().map(String::as_str).collect();
        println!("{:<name_width$}  {}", name, versions.join(", "));
    }

    Ok(exit_codes::SUCCESS)
}
