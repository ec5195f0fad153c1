//! CLI command implementations
//!
//! Every command returns `Ok(true)` when the run is clean and `Ok(false)`
//! when it found problems that should fail the process.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};
use colored::Colorize;
use rayon::prelude::*;
use sable_core::{
    CancellationToken, ConfigLoader, Console, LoadedConfig, SableError, Severity, StyleSettings,
    discover_files, unified_diff,
};
use sable_rules::{FixAllRulesOutcome, FixAllState, RuleRegistry, analyze, fix_all_rules};
use tracing::{debug, info};

use crate::OutputFormat;
use crate::output::{FileReport, OutputFormatter, ProgressReporter, print_rules, utils};

/// Default file written by `sable config init`
const DEFAULT_CONFIG_FILE: &str = ".sablerc.json";

pub struct CheckOptions {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub rules: Vec<String>,
    pub exclude: Vec<String>,
    pub error_on_warnings: bool,
    pub config: Option<PathBuf>,
    pub no_color: bool,
}

pub struct FixOptions {
    pub paths: Vec<PathBuf>,
    pub rules: Vec<String>,
    pub exclude: Vec<String>,
    pub max_iterations: usize,
    pub dry_run: bool,
    pub unsafe_fixes: bool,
    pub config: Option<PathBuf>,
    pub no_color: bool,
}

/// Settings from `--config`, or discovered from the first path
fn load_config(explicit: Option<&Path>, paths: &[PathBuf]) -> sable_core::Result<LoadedConfig> {
    let loaded = ConfigLoader::load(explicit, paths.first().map(PathBuf::as_path))?;
    match &loaded.path {
        Some(path) => debug!("Using configuration {}", path.display()),
        None => debug!("Using default configuration"),
    }
    Ok(loaded)
}

/// Built-in rules narrowed to `--rule` ids, with severity overrides applied
fn build_registry(settings: &StyleSettings, rules: &[String]) -> sable_core::Result<RuleRegistry> {
    let registry = RuleRegistry::builtin();
    let registry = if rules.is_empty() {
        registry
    } else {
        registry.with_rules(rules)?
    };
    Ok(registry.configured(settings))
}

fn read_source(path: &Path) -> sable_core::Result<String> {
    fs::read_to_string(path).map_err(|e| SableError::io_error(path, e))
}

fn is_failure(diagnostic: &sable_core::Diagnostic, error_on_warnings: bool) -> bool {
    diagnostic.severity == Severity::Error
        || (error_on_warnings && diagnostic.severity == Severity::Warning)
}

/// Check command implementation
pub fn check_command(options: CheckOptions) -> anyhow::Result<bool> {
    let start_time = Instant::now();
    let settings = load_config(options.config.as_deref(), &options.paths)?.settings;
    let registry = build_registry(&settings, &options.rules)?;
    let files = discover_files(&options.paths, &options.exclude)?;
    info!("Checking {} files with {} rules", files.len(), registry.len());

    let progress = ProgressReporter::new(files.len(), "Checking");
    let reports = files
        .par_iter()
        .map(|path| {
            let source = read_source(path)?;
            let diagnostics = analyze(&source, &registry, &settings)
                .into_iter()
                .map(|diagnostic| diagnostic.with_file(path))
                .collect();
            progress.inc();
            Ok(FileReport {
                path: path.clone(),
                source,
                diagnostics,
            })
        })
        .collect::<sable_core::Result<Vec<_>>>()?;
    progress.finish();

    OutputFormatter::new(options.format, options.no_color).print_reports(&reports);
    debug!(
        "Checked {} files in {}",
        reports.len(),
        utils::format_duration(start_time.elapsed())
    );

    let failed = reports
        .iter()
        .flat_map(|report| &report.diagnostics)
        .any(|diagnostic| is_failure(diagnostic, options.error_on_warnings));
    Ok(!failed)
}

/// Fix-all result for one file
struct FixReport {
    path: PathBuf,
    original: String,
    outcome: FixAllRulesOutcome,
}

/// Fix command implementation
///
/// Once `cancel` fires, running fix loops stop and no file is written.
pub fn fix_command(options: FixOptions, cancel: &CancellationToken) -> anyhow::Result<bool> {
    let start_time = Instant::now();
    let settings = load_config(options.config.as_deref(), &options.paths)?.settings;
    let registry = build_registry(&settings, &options.rules)?;
    let registry = if options.unsafe_fixes {
        registry
    } else {
        registry.safe_fixes_only()
    };
    let files = discover_files(&options.paths, &options.exclude)?;
    info!("Fixing {} files", files.len());

    let progress = ProgressReporter::new(files.len(), "Fixing");
    let results = files
        .par_iter()
        .map(|path| {
            let original = read_source(path)?;
            let outcome = fix_all_rules(
                &original,
                &registry,
                &settings,
                options.max_iterations,
                cancel,
            );
            progress.inc();
            Ok(FixReport {
                path: path.clone(),
                original,
                outcome,
            })
        })
        .collect::<sable_core::Result<Vec<_>>>()?;
    progress.finish();

    if cancel.is_cancelled() {
        eprintln!("{} interrupted, no files were written", "warning:".yellow().bold());
        return Ok(false);
    }

    let console = if options.no_color {
        Console::no_colors()
    } else {
        Console::new()
    };

    let mut changed = 0;
    for result in &results {
        if result.outcome.changed(&result.original) {
            changed += 1;
            if options.dry_run {
                print!(
                    "{}",
                    unified_diff(&result.path, &result.original, &result.outcome.source, &console)
                );
            } else {
                fs::write(&result.path, &result.outcome.source)
                    .with_context(|| format!("writing {}", result.path.display()))?;
                info!("Fixed {}", result.path.display());
            }
        }

        for summary in result.outcome.unconverged() {
            let reason = match summary.state {
                FixAllState::Aborted(reason) => reason.to_string(),
                _ => "interrupted".to_string(),
            };
            eprintln!(
                "{} {}: {} stopped after {} iterations ({}), {} remaining",
                "warning:".yellow().bold(),
                result.path.display(),
                summary.rule_id,
                summary.iterations,
                reason,
                summary.remaining
            );
        }
    }

    let reports: Vec<FileReport> = results
        .iter()
        .map(|result| FileReport {
            path: result.path.clone(),
            source: result.outcome.source.clone(),
            diagnostics: result
                .outcome
                .remaining
                .iter()
                .cloned()
                .map(|diagnostic| diagnostic.with_file(&result.path))
                .collect(),
        })
        .collect();
    OutputFormatter::new(OutputFormat::Human, options.no_color).print_reports(&reports);

    let verb = if options.dry_run { "Would fix" } else { "Fixed" };
    println!("{verb} {changed} of {} files", results.len());
    debug!("Fix finished in {}", utils::format_duration(start_time.elapsed()));

    let failed = reports
        .iter()
        .flat_map(|report| &report.diagnostics)
        .any(|diagnostic| is_failure(diagnostic, false));
    Ok(!failed)
}

/// Rules command implementation
pub fn rules_command(format: OutputFormat) -> anyhow::Result<bool> {
    print_rules(format, &RuleRegistry::builtin())?;
    Ok(true)
}

/// Config init command implementation
pub fn config_init_command(force: bool, path: Option<PathBuf>) -> anyhow::Result<bool> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    fs::write(&path, format!("{}\n", ConfigLoader::default_document()))
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(true)
}

/// Config schema command implementation
pub fn config_schema_command() -> anyhow::Result<bool> {
    println!("{}", ConfigLoader::schema());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fix_options(path: &Path) -> FixOptions {
        FixOptions {
            paths: vec![path.to_path_buf()],
            rules: Vec::new(),
            exclude: Vec::new(),
            max_iterations: sable_rules::DEFAULT_MAX_ITERATIONS,
            dry_run: false,
            unsafe_fixes: false,
            config: None,
            no_color: true,
        }
    }

    #[test]
    fn test_interrupted_fix_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Foo.cs");
        let source = "class Foo\n{\n    void M() {\n    }\n}\n";
        fs::write(&path, source).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let clean = fix_command(fix_options(&path), &cancel).unwrap();
        assert!(!clean);
        assert_eq!(fs::read_to_string(&path).unwrap(), source);

        let clean = fix_command(fix_options(&path), &CancellationToken::new()).unwrap();
        assert!(clean);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "class Foo\n{\n    void M()\n    {\n    }\n}\n"
        );
    }
}
