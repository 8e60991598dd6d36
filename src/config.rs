//! Resolved run configuration (spec section 6), built from `Cli`.

use crate::cli::Cli;
use crate::logging::DebugLevel;

#[derive(Clone, Debug)]
pub struct Config {
    pub reads: String,
    pub contigs: String,
    pub r2c: String,
    pub r2r: String,

    pub contained_frac: f64,
    pub min_block: u32,
    pub min_si: f64,
    pub min_mc_paths: usize,
    pub min_paths_in_group: usize,
    pub length_tolerance: u32,
    pub max_walk_nodes: usize,
    pub rng_seed: u64,
    pub debug_level: DebugLevel,
    pub dump_overlaps: Option<String>,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            reads: cli.reads.clone(),
            contigs: cli.contigs.clone(),
            r2c: cli.r2c.clone(),
            r2r: cli.r2r.clone(),
            contained_frac: cli.contained_frac,
            min_block: cli.min_block,
            min_si: cli.min_si,
            min_mc_paths: cli.min_mc_paths,
            min_paths_in_group: cli.min_paths_in_group,
            length_tolerance: cli.length_tolerance,
            max_walk_nodes: cli.max_walk_nodes,
            rng_seed: cli.rng_seed,
            debug_level: cli.debug_level,
            dump_overlaps: cli.dump_overlaps.clone(),
        }
    }
}
