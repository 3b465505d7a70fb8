use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use fnt_codec::{
    check_fountain, decode, encode, inspect, merge_from, merge_siblings, shrink, CoefficientsFactory,
    DecodeOutcome, EncodeOptions, EncodeOutcome, Entropy, FountainInfo, Overwrite, RowSizing,
};
use fnt_core::hash_to_hex;
use log::info;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fountain", version, about = "Rateless erasure coding for files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode SOURCE into a fountain file.
    Encode {
        source: PathBuf,
        output: PathBuf,
        /// Payload bytes per row.
        #[arg(long, conflicts_with = "coefficients")] row_size: Option<u32>,
        /// Target coefficient count; the row size is derived from it.
        #[arg(long)] coefficients: Option<u32>,
        /// Exact number of rows to write.
        #[arg(long)] rows: Option<u32>,
        /// Extra rows as a percentage of the coefficient count.
        #[arg(long)] percent: Option<f64>,
        /// Start with one verbatim row per source chunk.
        #[arg(long)] systematic: bool,
        /// Overwrite OUTPUT without asking.
        #[arg(long)] force: bool,
        /// Seed the coefficient generator for a reproducible file.
        #[arg(long)] seed: Option<u64>,
    },
    /// Recover the source from a solvable fountain file.
    Decode { fountain: PathBuf, output: PathBuf },
    /// Append rows from compatible fountain files, deleting them afterwards.
    Merge {
        fountain: PathBuf,
        /// Merge only this file instead of every compatible sibling.
        #[arg(long)] from: Option<PathBuf>,
    },
    /// Drop rows that carry no information.
    Shrink { fountain: PathBuf },
    /// Describe fountain files.
    Info {
        #[arg(required = true)] files: Vec<PathBuf>,
    },
}

fn confirm_overwrite(path: &Path) -> bool {
    print!("{} exists. Overwrite? [y/N] ", path.display());
    if io::stdout().flush().is_err() { return false; }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

fn run_encode<E: Entropy>(
    source: &Path,
    output: &Path,
    options: EncodeOptions,
    factory: &mut CoefficientsFactory<E>,
) -> anyhow::Result<()> {
    match encode(source, output, options, factory)? {
        EncodeOutcome::Encoded(report) => {
            let g = report.geometry();
            println!(
                "{} rows of {} coefficients, {} bytes each",
                report.rows, g.num_coefficients, g.row_size
            );
        }
        EncodeOutcome::Skipped => println!("{}", "Not overwriting".yellow()),
    }
    Ok(())
}

fn print_info(path: &Path) -> anyhow::Result<()> {
    match inspect(path)? {
        FountainInfo::Missing => println!("{}: {}", path.display(), "not found".red()),
        FountainInfo::NotFountain(e) => println!("{}: {} ({})", path.display(), "not a fountain file".red(), e),
        FountainInfo::Fountain(s) => {
            let g = s.geometry();
            println!("{}", path.display().to_string().bold());
            println!("  File length:   {}", s.file_len);
            println!("  Source SHA256: {}", hash_to_hex(&s.header.source_hash));
            println!("  Source length: {}", s.header.source_len);
            println!("  Row size:      {}", g.row_size);
            println!("  Coefficients:  {}", g.num_coefficients);
            println!("  Rows:          {}", s.rows);
            if s.solvable {
                println!("  {}", format!("Solvable in {} steps", s.steps).green());
            } else {
                println!("  {}", "Not solvable".red());
            }
        }
    }
    Ok(())
}

impl Command {
    /// Existing fountain files the command reads.
    fn fountain_inputs(&self) -> Vec<&Path> {
        match self {
            Command::Decode { fountain, .. } | Command::Shrink { fountain } => vec![fountain.as_path()],
            Command::Merge { fountain, from } => {
                let mut inputs = vec![fountain.as_path()];
                inputs.extend(from.as_deref());
                inputs
            }
            Command::Encode { .. } | Command::Info { .. } => Vec::new(),
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Magic/version pre-check before any command touches its inputs
    for path in cli.command.fountain_inputs() {
        check_fountain(path).with_context(|| format!("{} is not usable", path.display()))?;
    }

    match cli.command {
        Command::Encode { source, output, row_size, coefficients, rows, percent, systematic, force, seed } => {
            let sizing = match (row_size, coefficients) {
                (Some(r), _) => RowSizing::RowSize(r),
                (None, Some(n)) => RowSizing::CoefficientHint(n),
                (None, None) => RowSizing::default(),
            };
            let overwrite = if force { Overwrite::Replace } else { Overwrite::Ask(Box::new(confirm_overwrite)) };
            let options = EncodeOptions { systematic, sizing, rows, percent, overwrite, ..Default::default() };
            match seed {
                Some(seed) => run_encode(&source, &output, options, &mut CoefficientsFactory::seeded(seed))?,
                None => run_encode(&source, &output, options, &mut CoefficientsFactory::from_thread_rng())?,
            }
        }
        Command::Decode { fountain, output } => match decode(&fountain, &output)? {
            DecodeOutcome::Decoded { steps } => {
                println!("{} in {} steps", "Decoded".green(), steps);
            }
            DecodeOutcome::NotSolvable => {
                println!("{}: {}", fountain.display(), "Not solvable".red());
            }
        },
        Command::Merge { fountain, from: Some(other) } => {
            let rows = merge_from(&fountain, &other)?;
            println!("Merged {} rows from {}", rows, other.display());
        }
        Command::Merge { fountain, from: None } => {
            let merged = merge_siblings(&fountain)?;
            for path in &merged {
                println!("Merged {}", path.display());
            }
            info!("{} files merged into {}", merged.len(), fountain.display());
        }
        Command::Shrink { fountain } => {
            let report = shrink(&fountain)?;
            println!("{} -> {} rows", report.rows_before, report.rows_after);
            if !report.solvable {
                println!("{}", "Not solvable".yellow());
            }
        }
        Command::Info { files } => {
            for path in &files {
                print_info(path)?;
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    run(Cli::parse())
}
