//! Library surface for the `scara` scaffolder, split out from the `scara`
//! binary so the end-to-end pipeline (spec section 4.6) can be exercised
//! from integration tests (`tests/`) the way `pangenome-fastga-rs` splits
//! its FFI bindings from its CLI wrapper.

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod materialize;
pub mod overlap;
pub mod paths;
pub mod scaffold;
pub mod sequence;
