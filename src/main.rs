use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs::File,
    io::{self, BufWriter},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use treedump::{dump_tree, load_rules, validate_root, DumpError};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Print every non-ignored file under a directory as a fenced block",
    long_about = None
)]
struct Args {
    /// Directory to snapshot
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Write the snapshot to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log traversal decisions to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    // RUST_LOG wins unless --verbose asks for everything
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn spinner() -> Result<ProgressBar> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} {pos}")
            .context("Invalid progress template")?,
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    Ok(progress)
}

fn run(args: &Args) -> Result<()> {
    let root = validate_root(&args.path)?;
    let rules = load_rules(&root);

    // Never dump our own binary
    let mut exclude = Vec::new();
    match std::env::current_exe() {
        Ok(exe) => exclude.push(exe),
        Err(err) => tracing::debug!(error = %err, "cannot determine own path"),
    }

    match &args.out {
        Some(out_path) => {
            let file = File::create(out_path).map_err(|source| DumpError::OutputUnavailable {
                path: out_path.clone(),
                source,
            })?;
            // The snapshot must not contain itself
            exclude.push(out_path.clone());

            let progress = spinner()?;
            let stats = dump_tree(&root, &rules, &exclude, BufWriter::new(file), &progress)?;
            progress.finish_and_clear();

            println!("Output successfully written to: {}", out_path.display());
            println!(
                "{} files, {}",
                stats.files_written,
                format_size(stats.bytes_written, BINARY)
            );
            if stats.read_errors > 0 {
                eprintln!(
                    "{}",
                    format!("{} file(s) could not be read", stats.read_errors).yellow()
                );
            }
        }
        None => {
            let stdout = io::stdout().lock();
            dump_tree(
                &root,
                &rules,
                &exclude,
                BufWriter::new(stdout),
                &ProgressBar::hidden(),
            )?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Fatal run errors carry their own wording
            if err.is::<DumpError>() {
                eprintln!("{}", format!("{err:#}").red());
            } else {
                eprintln!("{} {:#}", "Error:".red().bold(), err);
            }
            ExitCode::FAILURE
        }
    }
}
