use clap::Parser;
use pnginfo::{inspect, Options, RunMode, SignatureMode};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PNGINFO_LOG=debug`.
const LOG_ENV: &str = "PNGINFO_LOG";

#[derive(Parser)]
#[command(name = "pnginfo", about = "Inspect the chunk stream of a PNG file")]
struct Cli {
    /// Report the decoded fields of one chunk type only (IHDR, tEXt, ...)
    #[arg(short = 'c', value_name = "chunk")]
    chunk: Option<String>,
    /// Read this file instead of standard input
    #[arg(short = 'f', value_name = "file")]
    file: Option<PathBuf>,
    /// List chunk names (the default; overrides -c)
    #[arg(short = 'l')]
    list: bool,
    /// Search forward for the PNG signature instead of requiring it at offset 0
    #[arg(short = 's')]
    scan: bool,
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pnginfo: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // -c is validated even when -l wins.
    let mut mode = match cli.chunk.as_deref() {
        Some(name) => RunMode::filter(name)?,
        None => RunMode::List,
    };
    if cli.list {
        mode = RunMode::List;
    }
    let options = Options {
        mode,
        signature: if cli.scan { SignatureMode::Scan } else { SignatureMode::Strict },
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut diag = stderr.lock();

    let summary = match &cli.file {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
            inspect(BufReader::new(file), &options, &mut out, &mut diag)
        }
        None => inspect(io::stdin().lock(), &options, &mut out, &mut diag),
    };
    // Flush what was reported even when the stream turned out bad.
    out.flush()?;
    let summary = summary?;
    tracing::debug!(
        signature_offset = summary.signature_offset,
        chunks = summary.chunks,
        "inspection complete"
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
