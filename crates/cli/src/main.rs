use anyhow::{Context, Result};
use clap::Parser;
use photogps::{paths, report};
use photogps_core::config::{self, AppConfig};
use photogps_core::{ExifTool, PropagationRunner};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "photogps=info,photogps_core=info";
const VERBOSE_LOG_FILTER: &str = "photogps=debug,photogps_core=debug";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = config::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut cfg);
    let root = paths::resolve_root(&cli.path)?;

    // Keep stdout clean for the JSON document.
    let mut progress: Box<dyn Write> = if cli.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    writeln!(
        progress,
        "Copy photo GPS tags to photos missing GPS tags, taken at a time close to each other."
    )?;

    let gateway = ExifTool::new(cfg.tool.clone());
    let summary = PropagationRunner::new(&gateway, &cfg)
        .run(&root, progress.as_mut())
        .with_context(|| format!("processing {}", root.display()))?;
    progress.flush()?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::json_summary(&summary)?)?
        );
    } else {
        tracing::info!("{}", report::text_summary(&summary));
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Parser)]
#[command(name = "photogps")]
#[command(
    about = "Copy photo GPS tags to photos missing GPS tags, taken at a time close to each other",
    long_about = None
)]
struct Cli {
    /// Photo directory, absolute or relative to the current directory
    path: PathBuf,

    /// Process all sub folders
    #[arg(short, long)]
    recursive: bool,

    /// Delete the backups exiftool leaves next to updated photos
    #[arg(short, long)]
    delete_originals: bool,

    /// Show matches without writing any tags
    #[arg(long)]
    dry_run: bool,

    /// Output JSON summary
    #[arg(long)]
    json: bool,

    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// exiftool executable to run
    #[arg(long)]
    exiftool: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags only switch options on; they never undo the config file.
    fn apply(&self, cfg: &mut AppConfig) {
        cfg.scan.recursive |= self.recursive;
        cfg.safety.delete_originals |= self.delete_originals;
        cfg.safety.dry_run |= self.dry_run;
        if let Some(program) = &self.exiftool {
            cfg.tool.program = program.clone();
        }
    }
}
