mod output;

use anyhow::{Context, Result};
use clap::Parser;
use output::{ObjectReport, OutputWriter, SizeOutput};
use sizer_core::{Oid, Repository, SizeCache, StoreConfig};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

/// Environment variable naming the default repository.
const REPO_ENV: &str = "SIZER_REPO";

/// Sizer - structural statistics for git object graphs
#[derive(Parser)]
#[command(name = "sizer")]
#[command(about = "Report depth, path length and object counts for git trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository to inspect (defaults to SIZER_REPO env var or the current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Hex IDs of the blobs or trees to size (read from stdin, one per line, if omitted)
    oids: Vec<String>,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.write_error(&err, 1);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli, output: &OutputWriter) -> Result<()> {
    // Determine repository: CLI arg > SIZER_REPO env var > current directory
    let root = cli
        .repo
        .or_else(|| std::env::var(REPO_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let args = if cli.oids.is_empty() {
        read_oids_from_stdin()?
    } else {
        cli.oids
    };
    let oids = args
        .iter()
        .map(|s| Oid::from_hex(s.trim()).with_context(|| format!("Invalid object ID: {}", s)))
        .collect::<Result<Vec<_>>>()?;

    let repo = Repository::open(StoreConfig::from_env(&root))
        .with_context(|| format!("Failed to open repository at {}", root.display()))?;
    let mut cache = SizeCache::new(repo);

    let mut objects = Vec::with_capacity(oids.len());
    for oid in oids {
        let size = cache
            .object_size(&oid)
            .with_context(|| format!("Failed to size object {}", oid))?;
        tracing::info!(%oid, %size, "sized object");
        objects.push(ObjectReport { oid, size });
    }

    let data = SizeOutput {
        success: true,
        result_code: 0,
        objects,
    };
    output.write(&data, || data.to_text())
}

fn read_oids_from_stdin() -> Result<Vec<String>> {
    if atty::is(atty::Stream::Stdin) {
        anyhow::bail!("No object IDs given (pass them as arguments or pipe them on stdin)");
    }

    let mut oids = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.with_context(|| "Failed to read object IDs from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            oids.push(line.to_string());
        }
    }
    Ok(oids)
}
