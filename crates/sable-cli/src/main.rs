//! Sable CLI
//!
//! Command-line interface for the Sable C# style analyzer

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use colored::Colorize;
use sable_core::{CancellationToken, DEFAULT_LOG_DIRECTIVE, init_tracing};
use sable_rules::DEFAULT_MAX_ITERATIONS;
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "sable")]
#[command(about = "Sable: StyleCop-compatible style checks and fixes for C#")]
#[command(version = sable_core::VERSION)]
#[command(
    long_about = "Sable checks C# sources against StyleCop layout, spacing, readability and\n\
naming rules, and rewrites them with automatic fixes.\n\
\n\
Examples:\n  \
sable check                      # Check the current directory\n  \
sable check --rule SA1500 src/   # Run a single rule\n  \
sable fix --dry-run src/         # Show the fixes as a diff\n  \
sable rules                      # List all rules\n  \
sable config init                # Write a default .sablerc.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.sablerc.json, sable.json, stylecop.json)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report style violations
    #[command(alias = "lint")]
    Check {
        /// Files or directories to check
        #[arg(help = "Files or directories to check (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(
            short,
            long,
            default_value = "human",
            help = "Output format for diagnostics"
        )]
        format: OutputFormat,

        /// Only run these rules
        #[arg(long = "rule", value_name = "ID", help = "Run only this rule (repeatable)")]
        rules: Vec<String>,

        /// Exclude patterns (glob syntax)
        #[arg(
            long,
            help = "Exclude files matching pattern (can be used multiple times)"
        )]
        exclude: Vec<String>,

        /// Exit with non-zero code on warnings as well as errors
        #[arg(long, help = "Exit with non-zero code on warnings too")]
        error_on_warnings: bool,
    },

    /// Apply automatic fixes until every rule settles
    Fix {
        /// Files or directories to fix
        #[arg(help = "Files or directories to fix (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Only run these rules
        #[arg(long = "rule", value_name = "ID", help = "Fix only this rule (repeatable)")]
        rules: Vec<String>,

        /// Exclude patterns (glob syntax)
        #[arg(
            long,
            help = "Exclude files matching pattern (can be used multiple times)"
        )]
        exclude: Vec<String>,

        /// Fix batches per rule before giving up
        #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS, help = "Maximum fix iterations per rule")]
        max_iterations: usize,

        /// Show a diff instead of writing files
        #[arg(long, help = "Print a unified diff of the fixes without writing files")]
        dry_run: bool,

        /// Apply unsafe fixes
        #[arg(
            long,
            help = "Also apply fixes that may be incorrect (renames, type aliases)"
        )]
        r#unsafe: bool,
    },

    /// List the rule catalog
    Rules {
        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a configuration file with every default
    Init {
        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Print the JSON Schema of the settings object
    Schema,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable output with colors and code frames
    Human,
    /// JSON on a single line
    Json,
    /// Indented JSON
    JsonPretty,
}

fn main() {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return;
    }

    let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();
    if no_color {
        colored::control::set_override(false);
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => DEFAULT_LOG_DIRECTIVE,
        1 => "sable=debug",
        _ => "sable=trace",
    };
    init_tracing(log_level);

    match run_command(cli, no_color) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Run the selected command; `Ok(false)` means the run found problems
fn run_command(cli: Cli, no_color: bool) -> anyhow::Result<bool> {
    let default_paths = |paths: Vec<PathBuf>| {
        if paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            paths
        }
    };

    match cli.command {
        Some(Commands::Check {
            paths,
            format,
            rules,
            exclude,
            error_on_warnings,
        }) => {
            let paths = default_paths(paths);
            debug!("Running check on {:?}", paths);
            commands::check_command(commands::CheckOptions {
                paths,
                format,
                rules,
                exclude,
                error_on_warnings,
                config: cli.config,
                no_color,
            })
        }

        Some(Commands::Fix {
            paths,
            rules,
            exclude,
            max_iterations,
            dry_run,
            r#unsafe,
        }) => {
            let paths = default_paths(paths);
            debug!("Running fix on {:?}", paths);
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            if let Err(err) = ctrlc::set_handler(move || on_interrupt.cancel()) {
                debug!("Ctrl-C handler not installed: {}", err);
            }
            commands::fix_command(
                commands::FixOptions {
                    paths,
                    rules,
                    exclude,
                    max_iterations,
                    dry_run,
                    unsafe_fixes: r#unsafe,
                    config: cli.config,
                    no_color,
                },
                &cancel,
            )
        }

        Some(Commands::Rules { format }) => commands::rules_command(format),

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { force } => commands::config_init_command(force, cli.config),
            ConfigAction::Schema => commands::config_schema_command(),
        },

        None => {
            // No subcommand provided, show help
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(true)
        }
    }
}
