//! Overlap record and classifier (spec section 4.1, component C2).
//!
//! Mirrors the teacher's `alignment_filtering.rs`/`create_overlap_graph.rs`
//! overhang math (the same b1/e1/l1, b2/e2/l2 naming from the miniasm paper)
//! but generalizes its 3-way taxonomy (internal match / contained / proper
//! overlap) into the spec's 5-way one.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, ScaraError};
use crate::sequence::open_maybe_gzip;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    Forward,
    Reverse,
}

/// Raw fields lifted straight off one tab-separated PAF line.
#[derive(Clone, Debug)]
pub struct PafRecord {
    pub qname: String,
    pub qlen: u32,
    pub qstart: u32,
    pub qend: u32,
    pub orientation: Orientation,
    pub tname: String,
    pub tlen: u32,
    pub tstart: u32,
    pub tend: u32,
    pub matches: u32,
    pub block_len: u32,
}

impl PafRecord {
    pub fn parse_line(line: &str) -> Option<Self> {
        let f: Vec<&str> = line.split('\t').collect();
        if f.len() < 12 {
            return None;
        }
        let orientation = match f[4] {
            "+" => Orientation::Forward,
            "-" => Orientation::Reverse,
            _ => return None,
        };
        Some(PafRecord {
            qname: f[0].to_string(),
            qlen: f[1].parse().ok()?,
            qstart: f[2].parse().ok()?,
            qend: f[3].parse().ok()?,
            orientation,
            tname: f[5].to_string(),
            tlen: f[6].parse().ok()?,
            tstart: f[7].parse().ok()?,
            tend: f[8].parse().ok()?,
            matches: f[9].parse().ok()?,
            block_len: f[10].parse().ok()?,
        })
    }
}

/// Reads every PAF line in `path` into an `Overlap`, ignoring unknown
/// trailing SAM-like tag fields (spec section 6: "unknown fields ignored").
/// A line that fails to parse aborts the whole file with a `Parse` error
/// (spec section 7: parse errors are fatal) rather than being skipped, the
/// one place this diverges from the teacher's own `Alignment::from_line`
/// "doesn't parse -> `None` -> skip" idiom.
pub fn load_paf(path: &str) -> Result<Vec<Overlap>> {
    let reader = open_maybe_gzip(path)?;
    let mut overlaps = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match PafRecord::parse_line(&line) {
            Some(r) => overlaps.push(Overlap::from_paf(&r)),
            None => {
                return Err(ScaraError::Parse {
                    kind: "paf",
                    path: path.to_string(),
                    line: idx + 1,
                    message: "expected at least 12 tab-separated PAF fields".into(),
                });
            }
        }
    }
    Ok(overlaps)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    Contained,
    Short,
    LowQual,
    ZeroExt,
    Usable,
}

/// A PAF record lifted into the derived-attribute form the classifier and
/// graph builder consume: target coordinates are reoriented ("adjusted")
/// into the frame where forward travel along the query matches forward
/// travel along the target, exactly as the teacher's b2/e2/l2 computation
/// does.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Overlap {
    pub qname: String,
    pub tname: String,
    pub qlen: u32,
    pub tlen: u32,
    pub orientation: Orientation,

    pub qstart: i64,
    pub qend: i64,
    /// Target alignment start, reoriented into the query-forward frame.
    pub tstart_adj: i64,
    /// Target alignment end, reoriented into the query-forward frame.
    pub tend_adj: i64,

    pub block_len: u32,
    pub matches: u32,
    pub si: f64,
}

impl Overlap {
    pub fn from_paf(r: &PafRecord) -> Self {
        let (tstart_adj, tend_adj) = match r.orientation {
            Orientation::Forward => (r.tstart as i64, r.tend as i64),
            Orientation::Reverse => (
                r.tlen as i64 - r.tend as i64,
                r.tlen as i64 - r.tstart as i64,
            ),
        };
        let si = if r.block_len == 0 {
            0.0
        } else {
            r.matches as f64 / r.block_len as f64
        };
        Overlap {
            qname: r.qname.clone(),
            tname: r.tname.clone(),
            qlen: r.qlen,
            tlen: r.tlen,
            orientation: r.orientation,
            qstart: r.qstart as i64,
            qend: r.qend as i64,
            tstart_adj,
            tend_adj,
            block_len: r.block_len,
            matches: r.matches,
            si,
        }
    }

    /// Left/right extension lengths on the query side of the alignment.
    pub fn qes1(&self) -> i64 {
        self.qstart
    }
    pub fn qes2(&self) -> i64 {
        self.qlen as i64 - self.qend
    }
    /// Left/right extension lengths on the (orientation-adjusted) target side.
    pub fn tes1(&self) -> i64 {
        self.tstart_adj
    }
    pub fn tes2(&self) -> i64 {
        self.tlen as i64 - self.tend_adj
    }

    fn query_coverage(&self) -> f64 {
        (self.qend - self.qstart) as f64 / self.qlen as f64
    }
    fn target_coverage(&self) -> f64 {
        (self.tend_adj - self.tstart_adj) as f64 / self.tlen as f64
    }

    /// Rule 1: contained if either sequence's covered fraction clears the
    /// threshold, tested independently (not jointly) per
    /// `original_source/src/SBridger.cpp`'s per-sequence `Overlap::Test()`.
    pub fn contained(&self, cfg: &Config) -> bool {
        self.query_coverage() >= cfg.contained_frac || self.target_coverage() >= cfg.contained_frac
    }

    /// Rule 2: short aligned block.
    pub fn short(&self, cfg: &Config) -> bool {
        self.block_len < cfg.min_block
    }

    /// Rule 3: low sequence identity.
    pub fn low_qual(&self, cfg: &Config) -> bool {
        self.si < cfg.min_si
    }

    /// Rules 1-3, shared by both the overlap-level gate and the per-edge
    /// reclassification: `None` means "proceed to directional testing".
    pub fn gate(&self, cfg: &Config) -> Option<Classification> {
        if self.contained(cfg) {
            Some(Classification::Contained)
        } else if self.short(cfg) {
            Some(Classification::Short)
        } else if self.low_qual(cfg) {
            Some(Classification::LowQual)
        } else {
            None
        }
    }

    /// Overlap-level overhang penalty: the aligned-but-unused slack on
    /// whichever side is tighter, on each end.
    pub fn overhang(&self) -> i64 {
        self.qes1().min(self.tes1()).max(0) + self.qes2().min(self.tes2()).max(0)
    }

    /// Overlap score (spec section 3): monotone in block length and
    /// identity, penalized by unaligned overhang.
    pub fn overlap_score(&self) -> f64 {
        self.block_len as f64 * self.si - self.overhang() as f64
    }

    /// Full 5-way classification using the primary direction (the one the
    /// graph builder would also pick first: whichever side starts further
    /// into its own sequence). Used standalone by the classifier tests and
    /// by the overlap-level gate before edge construction; the graph
    /// builder reclassifies each directed edge independently afterward
    /// (spec section 4.2 step 3), since the two mirror edges derived from
    /// one overlap can diverge on rule 4.
    pub fn classify(&self, cfg: &Config) -> Classification {
        if let Some(c) = self.gate(cfg) {
            return c;
        }
        let primary_ext = if self.qstart > self.tstart_adj {
            self.qstart - self.tstart_adj
        } else {
            self.tstart_adj - self.qstart
        };
        if primary_ext <= 0 {
            Classification::ZeroExt
        } else {
            Classification::Usable
        }
    }
}
