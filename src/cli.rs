use clap::Parser;

use crate::logging::DebugLevel;

#[derive(Parser)]
#[command(
    name = "scara",
    version = "1.0",
    about = "Scaffolds contigs into larger sequences using long-read overlap evidence"
)]
pub struct Cli {
    /// Input reads, FASTQ (optionally gzip-compressed)
    #[arg(long)]
    pub reads: String,

    /// Input contigs, FASTA (optionally gzip-compressed)
    #[arg(long)]
    pub contigs: String,

    /// Read-to-contig overlaps, PAF (optionally gzip-compressed)
    #[arg(long)]
    pub r2c: String,

    /// Read-to-read overlaps, PAF (optionally gzip-compressed)
    #[arg(long)]
    pub r2r: String,

    /// Minimum fraction of a sequence covered by an overlap before it is CONTAINED
    #[arg(long, default_value_t = 0.90)]
    pub contained_frac: f64,

    /// Minimum aligned block length before an overlap is SHORT
    #[arg(long, default_value_t = 500)]
    pub min_block: u32,

    /// Minimum sequence identity (matches / block length) before an overlap is LOWQUAL
    #[arg(long, default_value_t = 0.80)]
    pub min_si: f64,

    /// Minimum number of Monte-Carlo walks attempted per start anchor
    #[arg(long, default_value_t = 20)]
    pub min_mc_paths: usize,

    /// Minimum number of paths a PathGroup must contain to be kept
    #[arg(long, default_value_t = 2)]
    pub min_paths_in_group: usize,

    /// Length tolerance (bases) used when bucketing paths into PathGroups
    #[arg(long, default_value_t = 200)]
    pub length_tolerance: u32,

    /// Maximum number of nodes a single walk may visit before it is abandoned
    #[arg(long, default_value_t = 64)]
    pub max_walk_nodes: usize,

    /// Seed for the Monte-Carlo walk's random number generator
    #[arg(long, default_value_t = 42)]
    pub rng_seed: u64,

    /// Diagnostic verbosity
    #[arg(long, value_enum, default_value_t = DebugLevel::Info)]
    pub debug_level: DebugLevel,

    /// Optional path to dump the classified overlap set (bincode) for offline inspection
    #[arg(long)]
    pub dump_overlaps: Option<String>,
}
