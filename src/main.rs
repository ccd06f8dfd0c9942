//! actiondef: compile action/marker definition documents into Rust.
//!
//! ```bash
//! # Compile documents into src/generated and src/editor/generated
//! actiondef compile defs/combat.actions defs/level.actions
//!
//! # Report diagnostics only, as JSON
//! actiondef check --format json defs/*.actions
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use actiondef::config::Config;
use actiondef::dsl::{CompileResult, Compiler, Diagnostic, Document};
use actiondef::host::{self, HostError, OutputLayout, WriteReport};
use actiondef::registry::Registry;

#[derive(Parser)]
#[command(name = "actiondef")]
#[command(version)]
#[command(about = "Compile action and marker definition documents into Rust")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every pipeline stage
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile documents and write generated modules
    Compile {
        /// Config file (default: ./actiondef.yaml, then ~/.actiondef/config.yaml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Runtime output directory (overrides config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Editor output directory (overrides config)
        #[arg(long)]
        editor_out: Option<PathBuf>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compile documents and report diagnostics without writing anything
    Check {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "text", value_enum)]
        format: OutputFormat,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "actiondef=debug"
    } else {
        "actiondef=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            config,
            out,
            editor_out,
            files,
        } => cmd_compile(config.as_deref(), out, editor_out, &files),
        Commands::Check {
            config,
            format,
            files,
        } => cmd_check(config.as_deref(), format, &files),
    };

    match result {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

/// A compiled batch: every result, the cross-document registry and all
/// diagnostics in report order.
struct Batch {
    results: Vec<CompileResult>,
    registry: Registry,
    diagnostics: Vec<Diagnostic>,
}

/// Read and compile every file, then cross-check type ids and modules.
fn compile_files(compiler: &Compiler, files: &[PathBuf]) -> Result<Batch, HostError> {
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let name = host::document_name(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.clone(),
            source,
        })?;
        let result = compiler.compile_document(&Document::new(name, text));
        if !result.diagnostics.is_empty() {
            tracing::warn!(
                document = %result.document,
                count = result.diagnostics.len(),
                "diagnostics reported"
            );
        }
        results.push(result);
    }

    let (registry, rejected) = Registry::build(&results);
    tracing::debug!(
        actions = registry.actions().count(),
        markers = registry.markers().count(),
        "registered"
    );

    let diagnostics = results
        .iter()
        .flat_map(|r| r.diagnostics.iter().cloned())
        .chain(rejected)
        .collect();
    Ok(Batch {
        results,
        registry,
        diagnostics,
    })
}

fn cmd_compile(
    config: Option<&Path>,
    out: Option<PathBuf>,
    editor_out: Option<PathBuf>,
    files: &[PathBuf],
) -> Result<bool, HostError> {
    let mut config = Config::discover(config)?;
    if let Some(dir) = out {
        config.out_dir = dir;
    }
    if let Some(dir) = editor_out {
        config.editor_out_dir = dir;
    }

    let compiler = Compiler::new(config.compile_options());
    let batch = compile_files(&compiler, files)?;
    print_text(&batch.diagnostics);

    let layout = OutputLayout::from_config(&config);
    let mut report = WriteReport::default();
    for result in batch.registry.writable(&batch.results) {
        report.merge(host::write_artifacts(result, &layout)?);
    }
    report.merge(host::write_indexes(&layout)?);
    tracing::info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        removed = report.removed.len(),
        "done"
    );

    Ok(batch.diagnostics.iter().any(Diagnostic::is_error))
}

fn cmd_check(
    config: Option<&Path>,
    format: OutputFormat,
    files: &[PathBuf],
) -> Result<bool, HostError> {
    let config = Config::discover(config)?;
    let compiler = Compiler::new(config.compile_options());
    let Batch { diagnostics, .. } = compile_files(&compiler, files)?;

    match format {
        OutputFormat::Text => print_text(&diagnostics),
        OutputFormat::Json => match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: failed to encode diagnostics: {e}"),
        },
    }

    Ok(diagnostics.iter().any(Diagnostic::is_error))
}

fn print_text(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        println!("{diagnostic}");
    }
}
