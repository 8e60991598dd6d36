//! Path grouping and scaffold assembly (spec section 4.4, component C5).
//!
//! The teacher has no equivalent stage; the bucket-then-pick-best shape
//! mirrors `heuristic_simplification.rs::remove_multi_edges`'s
//! "collect candidates for a key, keep the best, drop the rest" structure,
//! generalized from per-edge dedup to per-path-group dedup. The exact
//! bucketing/chaining control flow (`mGroups`/`vFilteredGroups` per-start
//! winner map, `startNodes`/`endNodes` set-difference chain seeding)
//! follows `original_source/src/SBridger.cpp::groupAndProcessPaths`.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::config::Config;
use crate::graph::{rc_name, Graph, NodeKind};
use crate::paths::PathInfo;

/// A cluster of walks sharing a start node, an end node, and a length
/// within `length_tolerance` of one another.
pub struct PathGroup {
    pub start: String,
    pub end: String,
    pub length_bucket: i64,
    /// Aggregate sequence identity across member paths (spec section 3
    /// "PathGroup", used by section 4.4 steps 4 and 7 as the primary
    /// tie-break/selection criterion).
    pub avg_si: f64,
    pub paths: Vec<PathInfo>,
}

fn finalize_group(start: String, end: String, paths: Vec<PathInfo>) -> PathGroup {
    let length_bucket = paths.iter().map(|p| p.length).sum::<i64>() / paths.len() as i64;
    let avg_si = paths.iter().map(|p| p.avg_si).sum::<f64>() / paths.len() as f64;
    PathGroup { start, end, length_bucket, avg_si, paths }
}

/// Buckets a flat pool of walks into `PathGroup`s: first by (start, end),
/// then by clustering lengths within `cfg.length_tolerance` of each other.
pub fn group_paths(paths: Vec<PathInfo>, cfg: &Config) -> Vec<PathGroup> {
    let mut by_endpoint: BTreeMap<(String, String), Vec<PathInfo>> = BTreeMap::new();
    for p in paths {
        by_endpoint
            .entry((p.start_node().to_string(), p.end_node().to_string()))
            .or_default()
            .push(p);
    }

    let mut groups = Vec::new();
    for ((start, end), mut bucket) in by_endpoint {
        bucket.sort_by_key(|p| p.length);
        let mut cur: Vec<PathInfo> = Vec::new();
        for p in bucket {
            if let Some(last) = cur.last() {
                if p.length.abs_diff(last.length) as u32 > cfg.length_tolerance {
                    groups.push(finalize_group(start.clone(), end.clone(), std::mem::take(&mut cur)));
                }
            }
            cur.push(p);
        }
        if !cur.is_empty() {
            groups.push(finalize_group(start, end, cur));
        }
    }
    groups
}

/// Picks, for every start anchor, the single winning `PathGroup` (the one
/// backed by the most paths). Groups with fewer than `min_paths_in_group`
/// paths are dropped first (weak-group drop, spec scenario S3). A tie in
/// `numPaths` between two groups at the same start node is resolved
/// deterministically by higher aggregate `avgSI`, then by smaller
/// `endNodeName` (spec section 4.4 step 4) — it is not an error; only the
/// RC-duplicate-scaffold ambiguity of step 6 is fatal.
pub fn select_winners(groups: Vec<PathGroup>, cfg: &Config) -> BTreeMap<String, PathGroup> {
    let mut by_start: BTreeMap<String, Vec<PathGroup>> = BTreeMap::new();
    for g in groups.into_iter().filter(|g| g.paths.len() >= cfg.min_paths_in_group) {
        by_start.entry(g.start.clone()).or_default().push(g);
    }

    let mut winners = BTreeMap::new();
    for (start, mut candidates) in by_start {
        candidates.sort_by(|a, b| {
            b.paths
                .len()
                .cmp(&a.paths.len())
                .then_with(|| b.avg_si.partial_cmp(&a.avg_si).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.end.cmp(&b.end))
        });
        winners.insert(start, candidates.into_iter().next().expect("non-empty by construction"));
    }
    winners
}

/// Picks a single representative walk from a winning group: spec section
/// 4.4 step 7's "the PathInfo in it with the highest avgSI; ties broken by
/// longer length, then smaller endNodeName".
fn representative(group: &PathGroup) -> &PathInfo {
    group
        .paths
        .iter()
        .max_by(|a, b| {
            a.avg_si
                .partial_cmp(&b.avg_si)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.length.cmp(&b.length))
                .then_with(|| Reverse(a.end_node()).cmp(&Reverse(b.end_node())))
        })
        .expect("a PathGroup always has at least one path")
}

/// A finished scaffold: a chain of winning walks, `paths[i].end_node() ==
/// paths[i + 1].start_node()` for every adjacent pair.
pub struct Scaffold {
    pub segments: Vec<PathInfo>,
}

impl Scaffold {
    /// Every node name visited along the scaffold, in order, with the
    /// boundary node shared by two adjacent segments counted once. Used for
    /// the scaffold header (spec section 8 scenario S1's
    /// `Scaffold_1 C1 R1 C2` shows every node on the walk, not just the
    /// anchors) and for splice bookkeeping.
    pub fn full_trace(&self) -> Vec<String> {
        let mut trace = Vec::new();
        for (i, seg) in self.segments.iter().enumerate() {
            let nodes = if i == 0 { &seg.nodes[..] } else { &seg.nodes[1..] };
            trace.extend(nodes.iter().cloned());
        }
        trace
    }

    /// The subsequence of `full_trace` that are ANCHOR nodes — used for
    /// RC-duplicate detection (spec section 4.4 step 6 compares scaffolds by
    /// their anchor chain only) and for unused-contig accounting.
    pub fn anchor_trace(&self, graph: &Graph) -> Vec<String> {
        self.full_trace()
            .into_iter()
            .filter(|n| matches!(graph.node(n).map(|node| node.kind), Some(NodeKind::Anchor)))
            .collect()
    }
}

/// Chains winning path groups into full scaffolds following
/// `SBridger::groupAndProcessPaths`'s `startNodes`/`endNodes` set-difference
/// seeding: a scaffold begins at any node that is a winner start but never
/// a winner end, then follows winners end-to-end until the chain runs out
/// or would revisit a node (cycle guard).
pub fn chain_scaffolds(winners: &BTreeMap<String, PathGroup>) -> Vec<Scaffold> {
    let start_nodes: BTreeSet<&String> = winners.keys().collect();
    let end_nodes: BTreeSet<&String> = winners.values().map(|g| &g.end).collect();
    let true_starts: Vec<&String> = start_nodes.difference(&end_nodes).copied().collect();

    let mut scaffolds = Vec::new();
    for start in true_starts {
        let mut segments = Vec::new();
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut cur = start.clone();
        visited.insert(cur.clone());
        while let Some(group) = winners.get(&cur) {
            segments.push(representative(group).clone());
            if !visited.insert(group.end.clone()) {
                debug!("scaffold chain from {start} stopped: would revisit {}", group.end);
                break;
            }
            cur = group.end.clone();
        }
        if !segments.is_empty() {
            scaffolds.push(Scaffold { segments });
        }
    }
    scaffolds
}

/// Drops scaffolds that are the exact reverse complement of one already
/// kept (spec section 8, scenario S2), keeping whichever orientation sorts
/// first lexicographically for determinism.
pub fn dedup_rc_scaffolds(scaffolds: Vec<Scaffold>, graph: &Graph) -> Vec<Scaffold> {
    let mut seen_canon: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut kept = Vec::new();
    for scaffold in scaffolds {
        let trace = scaffold.anchor_trace(graph);
        let rc_trace: Vec<String> = trace.iter().rev().map(|n| rc_name(n)).collect();
        let canon = std::cmp::min(trace, rc_trace);
        if seen_canon.insert(canon) {
            kept.push(scaffold);
        }
    }
    kept
}
