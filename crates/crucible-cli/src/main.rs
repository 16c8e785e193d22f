//! Crucible CLI
//!
//! A command-line driver for the crucible compile worker, standing in for
//! the judging pipeline during local operation and debugging.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crucible::{CompileRequest, CompileResult, Config, EXAMPLE_CONFIG, ResourceLimits, Worker};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crucible")]
#[command(about = "A sandboxed compile worker for untrusted source code")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: crucible.toml)
        #[arg(short, long, default_value = "crucible.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Compile source code
    Compile {
        /// Source file to compile
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Language ID (e.g., c11, cpp17, rust)
        #[arg(short, long)]
        language: String,

        /// CPU time limit in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Memory limit in KB
        #[arg(short, long)]
        memory_limit: Option<u64>,
    },

    /// List available languages
    Languages,

    /// Show effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Compile {
            source,
            language,
            time_limit,
            memory_limit,
        } => run_compile(config, &source, &language, time_limit, memory_limit).await,
        Commands::Languages => {
            list_languages(&config);
            Ok(())
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn run_compile(
    config: Config,
    source: &PathBuf,
    language_id: &str,
    time_limit: Option<f64>,
    memory_limit: Option<u64>,
) -> Result<()> {
    let source_content = tokio::fs::read(source)
        .await
        .context("failed to read source file")?;

    let worker = Worker::new(config);
    let language = worker
        .config()
        .get_language(language_id)
        .context("unknown language")?;

    // Only include explicitly-specified limits so they don't override
    // per-language defaults
    let user_limits = ResourceLimits {
        time_limit,
        memory_limit,
        ..ResourceLimits::none()
    };
    let has_user_limits = time_limit.is_some() || memory_limit.is_some();

    info!(language = %language.name, "compiling source");

    let result = worker
        .compile(CompileRequest {
            source: &source_content,
            language,
            limits: if has_user_limits {
                Some(&user_limits)
            } else {
                None
            },
        })
        .await;

    match result {
        CompileResult::Success { artifact_path } => {
            println!("Compilation successful");
            println!("Artifact: {}", artifact_path.display());
            Ok(())
        }
        CompileResult::CompileError { diagnostics } => {
            println!("Compilation failed");
            if !diagnostics.is_empty() {
                println!("\nCompiler output:\n{diagnostics}");
            }
            std::process::exit(1);
        }
        CompileResult::ResourceExceeded { kind } => {
            println!("Compilation exceeded the {kind} limit");
            std::process::exit(1);
        }
        CompileResult::InputTooLarge { size, limit } => {
            println!("Source too large: {size} bytes (limit {limit})");
            std::process::exit(1);
        }
        CompileResult::Internal { error } => {
            eprintln!("Internal error: {error}");
            std::process::exit(2);
        }
    }
}

fn list_languages(config: &Config) {
    println!("Available languages:\n");

    let mut languages: Vec<_> = config.languages.iter().collect();
    languages.sort_by_key(|(id, _)| *id);

    for (id, lang) in languages {
        let lang_type = if lang.is_compiled() {
            "compiled"
        } else {
            "no compile step"
        };
        println!("  {:<15} {} ({})", id, lang.name, lang_type);
    }
}

fn show_config(config: &Config) {
    println!("Source size limit: {} bytes", config.max_source_size);
    println!(
        "Diagnostics capture limit: {} bytes",
        config.max_diagnostics_bytes
    );
    println!("Artifact directory: {}", config.artifact_dir().display());
    println!();
    println!("Default resource limits:");
    println!("  Time limit: {:?} s", config.default_limits.time_limit);
    println!(
        "  Wall time limit: {:?} s",
        config.default_limits.wall_time_limit
    );
    println!(
        "  Memory limit: {:?} KB",
        config.default_limits.memory_limit
    );
    println!("  Stack limit: {:?} KB", config.default_limits.stack_limit);
    println!("  Output limit: {:?} KB", config.default_limits.max_output);
    println!(
        "  Max open files: {:?}",
        config.default_limits.max_open_files
    );
    println!();
    println!("Languages configured: {}", config.languages.len());
}

async fn init_config(output: &PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
