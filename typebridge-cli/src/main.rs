//! # typebridge
//!
//! Generate Swift and Kotlin bindings from TypeScript interfaces.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bindings using ./typebridge.toml
//! typebridge generate
//!
//! # Preview without writing
//! typebridge generate --dry-run
//!
//! # Regenerate on every source change
//! typebridge generate --watch
//!
//! # Fail (exit code 2) when generated files are stale
//! typebridge check
//!
//! # Dump the extracted model as JSON
//! typebridge inspect --target api
//!
//! # Initialize configuration
//! typebridge init
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use typebridge_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::CliError,
    generator::{BindingGenerator, InspectReport},
    watcher::SourceWatcher,
    writer::{outdated_files, FileWriter, WriteStatus},
};

#[derive(Parser)]
#[command(name = "typebridge")]
#[command(author, version, about = "Generate Swift and Kotlin bindings from TypeScript interfaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings for every configured target and language
    Generate {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Watch for source changes and regenerate
        #[arg(short, long)]
        watch: bool,

        /// Skip methods with unsupported types instead of failing
        #[arg(long)]
        skip_invalid_methods: bool,

        /// Strip the `I` prefix from interface names
        #[arg(long)]
        drop_prefix: bool,
    },

    /// Check that generated files are up-to-date
    Check {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the extracted modules and named types as JSON
    Inspect {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only report this parse target
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Initialize a new typebridge configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            config,
            dry_run,
            watch,
            skip_invalid_methods,
            drop_prefix,
        } => {
            let args = CliArgs {
                skip_invalid_methods: skip_invalid_methods.then_some(true),
                drop_prefix: drop_prefix.then_some(true),
            };
            cmd_generate(config.as_deref(), &args, dry_run, watch)
        }

        Commands::Check { config } => cmd_check(config.as_deref()),

        Commands::Inspect { config, target } => cmd_inspect(config.as_deref(), target.as_deref()),

        Commands::Init { output, force } => cmd_init(output, force),
    }
}

/// Generate command implementation.
fn cmd_generate(
    config_path: Option<&Path>,
    args: &CliArgs,
    dry_run: bool,
    watch: bool,
) -> Result<(), CliError> {
    let config = ConfigManager::load(config_path)?;
    let config = ConfigManager::merge_cli_args(config, args);

    if watch {
        run_watch_mode(config, dry_run)
    } else {
        run_generate(&BindingGenerator::new(config), dry_run)
    }
}

/// Run generation once.
fn run_generate(generator: &BindingGenerator, dry_run: bool) -> Result<(), CliError> {
    println!("{}", "Generating bindings...".cyan());

    let output = generator.generate()?;

    println!(
        "  Extracted {} module(s)",
        output.module_count.to_string().green()
    );

    if !output.skipped.is_empty() {
        println!(
            "{} {} method(s) skipped:",
            "Warning:".yellow(),
            output.skipped.len()
        );
        for skipped in &output.skipped {
            println!(
                "  {}.{}: {}",
                skipped.module, skipped.method, skipped.reason
            );
        }
    }

    if output.files.is_empty() {
        println!("{}", "No renders configured.".yellow());
        return Ok(());
    }

    let writer = FileWriter::new(dry_run);
    let mut unchanged = 0;
    for report in writer.write_all(&output.files)? {
        let path = report.file.path.display();
        match report.status {
            WriteStatus::Written => {
                println!(
                    "{} Written {} bytes to {}",
                    "✓".green(),
                    report.file.content.len(),
                    path
                );
            }
            WriteStatus::Unchanged => unchanged += 1,
            WriteStatus::Previewed => {
                println!("{} Would write to {}:", "[dry-run]".yellow(), path);
                println!("{}", "─".repeat(60).dimmed());
                println!("{}", report.file.content);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    if unchanged > 0 {
        println!("  {} file(s) unchanged", unchanged.to_string().dimmed());
    }

    Ok(())
}

/// Run in watch mode.
fn run_watch_mode(config: Config, dry_run: bool) -> Result<(), CliError> {
    let root = config.base_dir.clone();
    let generator = BindingGenerator::new(config);

    println!("{}", "Starting watch mode...".cyan());
    println!("  Watching: {}", root.display());
    println!("  Press Ctrl+C to stop\n");

    if let Err(e) = run_generate(&generator, dry_run) {
        print_error(&e);
    }

    let (_guard, batches) = SourceWatcher::new(&root).start()?;

    println!("\n{}", "Watching for changes...".cyan());

    for batch in batches {
        match batch {
            Ok(changes) => {
                for change in &changes {
                    println!("\n{} {}", "File changed:".cyan(), change.path().display());
                }
            }
            Err(e) => {
                println!("{} {}", "Watch error:".red(), e);
                continue;
            }
        }

        if let Err(e) = run_generate(&generator, dry_run) {
            println!("{} {}", "Generation error:".red(), e);
        }

        println!("\n{}", "Watching for changes...".cyan());
    }

    Ok(())
}

/// Check command implementation.
fn cmd_check(config_path: Option<&Path>) -> Result<(), CliError> {
    println!("{}", "Checking generated files...".cyan());

    let config = ConfigManager::load(config_path)?;
    let output = BindingGenerator::new(config).generate()?;

    let outdated = outdated_files(&output.files);
    if outdated.is_empty() {
        println!(
            "{} {} file(s) are up-to-date",
            "✓".green(),
            output.files.len()
        );
        return Ok(());
    }

    println!("{} Generated files are out of date:", "✗".red());
    for path in &outdated {
        println!("  {}", path.display());
    }
    println!("  Run 'typebridge generate' to update");

    Err(CliError::Validation(format!(
        "{} generated file(s) are out of date",
        outdated.len()
    )))
}

/// Inspect command implementation.
fn cmd_inspect(config_path: Option<&Path>, target: Option<&str>) -> Result<(), CliError> {
    let config = ConfigManager::load(config_path)?;
    config.validate()?;

    let project = BindingGenerator::new(config).parse()?;
    let report = InspectReport::new(&project, target)?;

    let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
    println!("{}", json);

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
