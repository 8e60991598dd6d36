//! Error taxonomy for the scaffolder (spec section 7).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScaraError>;

#[derive(Error, Debug)]
pub enum ScaraError {
    #[error("failed to parse {kind} file {path} at line {line}: {message}")]
    Parse {
        kind: &'static str,
        path: String,
        line: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An edge classified USABLE but its spliced prefix was non-positive.
    /// This means the edge should have classified ZERO_EXT; upstream bug.
    #[error(
        "edge {start} -> {end} classified usable but yielded a non-positive prefix length ({prefix_len}); it should have classified as ZERO_EXT"
    )]
    ClassificationMismatch {
        start: String,
        end: String,
        prefix_len: i64,
    },

    #[error("scaffold comparison received an empty scaffold")]
    EmptyScaffold,

    #[error("invariant breach: {0}")]
    InvariantBreach(String),

    /// Non-fatal (spec section 7): no scaffolds survived grouping and
    /// assembly. The driver still emits every contig as an unused record.
    #[error("no scaffolds were produced; every contig is emitted as an unused record")]
    EmptyOutput,
}
