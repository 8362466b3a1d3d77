// ==============================================================================
// main.rs - ncRNA Profiler Entry Point
// ==============================================================================
// Description: Command-line interface for cmscan filtering and profile tables
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ncrna_profiler::amino_acids::{build_frequency_table, ResidueCounts};
use ncrna_profiler::family_filter::FamilyFilter;
use ncrna_profiler::models::{QualityThresholds, BIAS_MAX, EVALUE_MAX};
use ncrna_profiler::output::{write_table_file, AA_FREQUENCIES_FILE_NAME};
use ncrna_profiler::parsers::{read_sample_list, FamilyAllowlist};
use ncrna_profiler::processor::{ensure_dir, ProfileProcessor, REPORT_EXTENSION};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build ncRNA count and presence/absence tables from cmscan reports
    Profile {
        /// File with one sample ID per line
        file_list: PathBuf,

        /// Folder holding {sample}.cmscan reports
        input_folder: PathBuf,

        /// Folder receiving ncRNA_profiles_counts.csv and ncRNA_profiles_binary.csv
        output_folder: PathBuf,

        /// Maximum accepted hit bias (inclusive)
        #[arg(long, env = "NCRNA_BIAS_MAX", default_value_t = BIAS_MAX)]
        bias_max: f64,

        /// E-value a hit must stay below
        #[arg(long, env = "NCRNA_EVALUE_MAX", default_value_t = EVALUE_MAX)]
        evalue_max: f64,

        /// Report file extension
        #[arg(long, default_value = REPORT_EXTENSION)]
        extension: String,
    },

    /// Drop cmscan hits to Rfam families outside the allow-lists
    Filter {
        /// cmscan report to filter (plain or gzip)
        input_file: PathBuf,

        /// Filtered report, same format as the input
        output_file: PathBuf,

        /// Allow-list file (repeatable)
        #[arg(
            short = 'a',
            long = "allowlist",
            value_name = "FILE",
            default_values = ["config/archaea.csv", "config/bacteria.csv"]
        )]
        allowlists: Vec<PathBuf>,

        /// 0-based whitespace field holding the family identifier
        /// (default: accession column of the report header)
        #[arg(long)]
        family_field: Option<usize>,
    },

    /// Print amino-acid frequencies of a protein FASTA file
    AaFrequency {
        /// Protein FASTA file
        fasta_file: PathBuf,
    },

    /// Combine per-sample amino-acid frequency files into one table
    AaTable {
        /// File with one sample ID per line
        file_list: PathBuf,

        /// Folder holding {sample}.csv frequency files
        input_folder: PathBuf,

        /// Folder receiving aa_frequencies.csv
        output_folder: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing (stderr, so stdout stays free for data)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ncrna_profiler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            // Usage errors go to stdout with a failing status
            println!("{}", e.render());
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    match args.command {
        Command::Profile {
            file_list,
            input_folder,
            output_folder,
            bias_max,
            evalue_max,
            extension,
        } => {
            let samples = read_sample_list(&file_list)?;
            info!("Processing files...");

            let outputs = ProfileProcessor::new(input_folder, output_folder)
                .with_thresholds(QualityThresholds::new(bias_max, evalue_max))
                .with_extension(extension)
                .process(&samples)?;

            info!(
                "Profiles complete: {} families x {} samples",
                outputs.n_families, outputs.n_samples
            );
        }

        Command::Filter {
            input_file,
            output_file,
            allowlists,
            family_field,
        } => {
            let allowlist = FamilyAllowlist::load(&allowlists)?;
            info!(
                "Loaded {} allowed families from {} lists",
                allowlist.len(),
                allowlists.len()
            );

            let mut filter = FamilyFilter::new(&allowlist);
            if let Some(index) = family_field {
                filter = filter.with_field_index(index);
            }
            filter.filter_file(&input_file, &output_file)?;
        }

        Command::AaFrequency { fasta_file } => {
            let counts = ResidueCounts::from_fasta(&fasta_file)?;
            counts
                .write_frequencies(std::io::stdout().lock())
                .context("Failed to write amino-acid frequencies")?;
        }

        Command::AaTable {
            file_list,
            input_folder,
            output_folder,
        } => {
            let samples = read_sample_list(&file_list)?;
            info!("Processing files...");

            let table = build_frequency_table(&input_folder, &samples)?;

            ensure_dir(&output_folder)?;
            write_table_file(&table, &output_folder.join(AA_FREQUENCIES_FILE_NAME))?;
        }
    }

    Ok(())
}
