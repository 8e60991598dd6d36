//! Path generation (spec section 4.3, component C4).
//!
//! The teacher has no walk-and-extend code of its own — its "paths" are
//! maximal non-branching chains discovered by
//! `compress_graph.rs::compress_unitigs` via an `out_single`-style
//! indegree/outdegree==1 walk. That walk's shape (follow the best outgoing
//! edge, bail out at a branch or dead end) and `bubble_removal.rs`'s
//! `bfs_limited` visited-set bookkeeping are adapted here into three
//! explicit strategies over the strand-doubled graph.

use std::collections::HashSet;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::graph::{rc_name, Edge, Graph, Node, NodeKind};

fn is_anchor(node: &Node) -> bool {
    node.kind == NodeKind::Anchor
}

/// A path's orientation relative to its first edge (spec section 3
/// "PathInfo"): RIGHT iff that edge's `QES2 > QES1`. Grouping (component C5)
/// only ever buckets RIGHT-oriented paths; a LEFT path is replaced by its
/// reversed form first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct PathInfo {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
    pub length: i64,
    pub avg_si: f64,
    pub direction: Direction,
}

impl PathInfo {
    pub fn start_node(&self) -> &str {
        self.nodes.first().expect("a path always has at least one node")
    }

    pub fn end_node(&self) -> &str {
        self.nodes.last().expect("a path always has at least one node")
    }

    /// Diagnostic-only secondary length measure (sum of aligned block
    /// lengths rather than spliced-prefix lengths). Never used for
    /// tie-breaking (spec section 9, Open Question on `length2`).
    pub fn length2(&self) -> i64 {
        self.edges.iter().map(|e| e.s_end - e.s_start).sum()
    }

    /// The same walk traced on the opposite strand (spec section 3
    /// "Reversed path"): edge order inverted, each edge replaced by its
    /// analytic RC mirror (`Edge::mirrored`), node names RC-flipped.
    pub fn reverse(&self, graph: &Graph) -> PathInfo {
        let nodes: Vec<String> = self.nodes.iter().rev().map(|n| rc_name(n)).collect();
        let edges: Vec<Edge> = self.edges.iter().rev().map(|e| e.mirrored()).collect();
        finish(graph, nodes, edges)
    }
}

fn finish(graph: &Graph, nodes: Vec<String>, edges: Vec<Edge>) -> PathInfo {
    let prefix_total: i64 = edges.iter().map(|e| e.prefix_len).sum();
    let final_len = graph.node(nodes.last().expect("non-empty walk")).map(|n| n.seq.len() as i64).unwrap_or(0);
    let avg_si = if edges.is_empty() { 0.0 } else { edges.iter().map(|e| e.si).sum::<f64>() / edges.len() as f64 };
    let direction = match edges.first() {
        Some(first) if first.qes2 > first.qes1 => Direction::Right,
        _ => Direction::Left,
    };
    PathInfo { nodes, edges, length: prefix_total + final_len, avg_si, direction }
}

/// Normalises every path to RIGHT orientation (spec section 4.4 step 1):
/// "If direction is LEFT, replace the path by its reversed form and
/// recompute PathInfo. All downstream work sees RIGHT-oriented paths only."
pub fn normalize_directions(graph: &Graph, paths: Vec<PathInfo>) -> Vec<PathInfo> {
    paths
        .into_iter()
        .map(|p| match p.direction {
            Direction::Right => p,
            Direction::Left => p.reverse(graph),
        })
        .collect()
}

/// Shared greedy walk: from `start`, repeatedly follow the unvisited
/// outgoing edge that maximizes `score`, breaking ties by the lexically
/// smaller target node name for determinism. Per spec section 4.3, a walk
/// stops successfully the moment it lands on an ANCHOR node; it stops
/// unsuccessfully at a dead end, a node already visited by this walk (cycle
/// guard, enforced here by filtering candidates rather than detecting the
/// revisit after the fact), or `max_walk_nodes`.
fn greedy_walk(graph: &Graph, start: &str, cfg: &Config, score: impl Fn(&Edge) -> f64) -> PathInfo {
    let mut nodes = vec![start.to_string()];
    let mut edges = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(start.to_string());
    let mut cur = start.to_string();

    while nodes.len() < cfg.max_walk_nodes {
        let node = match graph.node(&cur) {
            Some(n) => n,
            None => break,
        };
        let mut best: Option<&Edge> = None;
        for e in node.out_edges.iter().filter(|e| !visited.contains(&e.end)) {
            best = match best {
                None => Some(e),
                Some(b) => {
                    let (s, sb) = (score(e), score(b));
                    if s > sb || (s == sb && e.end < b.end) { Some(e) } else { Some(b) }
                }
            };
        }
        let edge = match best {
            Some(e) => e.clone(),
            None => break,
        };
        visited.insert(edge.end.clone());
        cur = edge.end.clone();
        nodes.push(cur.clone());
        edges.push(edge);
        if graph.node(&cur).map(is_anchor).unwrap_or(false) {
            break;
        }
    }
    finish(graph, nodes, edges)
}

/// Deterministic greedy walk maximizing overlap score (OS) at every step.
pub fn max_os_walk(graph: &Graph, start: &str, cfg: &Config) -> PathInfo {
    greedy_walk(graph, start, cfg, |e| e.os)
}

/// Deterministic greedy walk maximizing extension score (ES) at every step.
pub fn max_es_walk(graph: &Graph, start: &str, cfg: &Config) -> PathInfo {
    greedy_walk(graph, start, cfg, |e| e.es)
}

/// Monte-Carlo walk: at each step, samples an unvisited outgoing edge with
/// probability proportional to its (non-negative) overlap score. Given a
/// seeded `StdRng` and a fixed graph, this is fully reproducible (spec
/// section 8, scenario S6), since edge lists are sorted by target name at
/// graph-build time regardless of PAF input order.
pub fn monte_carlo_walk(graph: &Graph, start: &str, cfg: &Config, rng: &mut StdRng) -> PathInfo {
    let mut nodes = vec![start.to_string()];
    let mut edges = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(start.to_string());
    let mut cur = start.to_string();

    while nodes.len() < cfg.max_walk_nodes {
        let node = match graph.node(&cur) {
            Some(n) => n,
            None => break,
        };
        let candidates: Vec<&Edge> = node.out_edges.iter().filter(|e| !visited.contains(&e.end)).collect();
        if candidates.is_empty() {
            break;
        }
        let weights: Vec<f64> = candidates.iter().map(|e| e.os.max(0.0) + 1e-6).collect();
        let total: f64 = weights.iter().sum();
        let mut x = rng.gen_range(0.0..total);
        let mut chosen = candidates[0];
        for (c, w) in candidates.iter().zip(weights.iter()) {
            if x < *w {
                chosen = c;
                break;
            }
            x -= w;
        }
        let edge = chosen.clone();
        visited.insert(edge.end.clone());
        cur = edge.end.clone();
        nodes.push(cur.clone());
        edges.push(edge);
        if graph.node(&cur).map(is_anchor).unwrap_or(false) {
            break;
        }
    }
    finish(graph, nodes, edges)
}

/// A walk is a usable anchor-to-anchor path only if it actually crossed at
/// least one edge and landed on an ANCHOR node; a single-node walk (no
/// outgoing edges at all) or one stranded on a READ node is discarded (spec
/// section 4.3: "no outgoing edges exist (discard)").
fn is_anchor_to_anchor(graph: &Graph, path: &PathInfo) -> bool {
    if path.edges.is_empty() {
        return false;
    }
    matches!(graph.node(path.end_node()).map(|n| n.kind), Some(NodeKind::Anchor))
}

#[derive(Default, Debug, Clone)]
pub struct PathStats {
    pub max_os: usize,
    pub max_es: usize,
    pub monte_carlo: usize,
    pub discarded: usize,
}

/// Generates the full anchor-to-anchor path pool (spec section 4.3): a
/// deterministic MAX-OS walk and a deterministic MAX-ES walk from every
/// anchor node with outgoing edges (iterated in stable, sorted-by-name
/// order per spec section 5), followed by Monte-Carlo sampling until the
/// combined pool holds at least `max(MinMCPaths, |a| + |b|)` successful
/// walks.
pub fn generate_paths(graph: &Graph, cfg: &Config) -> (Vec<PathInfo>, PathStats) {
    let mut pool = Vec::new();
    let mut stats = PathStats::default();

    let starts: Vec<&String> = graph
        .anchors
        .iter()
        .filter(|(_, n)| !n.out_edges.is_empty())
        .map(|(name, _)| name)
        .collect();

    for start in &starts {
        let p = max_os_walk(graph, start, cfg);
        if is_anchor_to_anchor(graph, &p) {
            stats.max_os += 1;
            pool.push(p);
        } else {
            stats.discarded += 1;
        }
        let p = max_es_walk(graph, start, cfg);
        if is_anchor_to_anchor(graph, &p) {
            stats.max_es += 1;
            pool.push(p);
        } else {
            stats.discarded += 1;
        }
    }

    let deterministic_count = stats.max_os + stats.max_es;
    let mc_target = cfg.min_mc_paths.max(deterministic_count);
    let mut rng = StdRng::seed_from_u64(cfg.rng_seed);

    if !starts.is_empty() {
        // Sampling is capped well above the target so a graph with too few
        // reachable anchors can't spin forever trying to hit an unreachable
        // floor; the cap is generous (20x) since most samples succeed.
        let max_attempts = mc_target.saturating_mul(20).max(1000);
        let mut attempts = 0;
        while stats.monte_carlo < mc_target && attempts < max_attempts {
            attempts += 1;
            let idx = rng.gen_range(0..starts.len());
            let start = starts[idx];
            let p = monte_carlo_walk(graph, start, cfg, &mut rng);
            if is_anchor_to_anchor(graph, &p) {
                stats.monte_carlo += 1;
                pool.push(p);
            } else {
                stats.discarded += 1;
            }
        }
        if stats.monte_carlo < mc_target {
            debug!(
                "monte-carlo sampler reached its attempt cap with only {}/{} paths",
                stats.monte_carlo, mc_target
            );
        }
    }

    (pool, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, Graph};
    use crate::logging::DebugLevel;
    use crate::overlap::{Orientation, Overlap, PafRecord};
    use crate::sequence::{Sequence, SequenceStore};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use std::rc::Rc;

    fn cfg() -> Config {
        Config {
            reads: String::new(),
            contigs: String::new(),
            r2c: String::new(),
            r2r: String::new(),
            contained_frac: 0.90,
            min_block: 500,
            min_si: 0.80,
            min_mc_paths: 20,
            min_paths_in_group: 2,
            length_tolerance: 200,
            max_walk_nodes: 8,
            rng_seed: 7,
            debug_level: DebugLevel::Silent,
            dump_overlaps: None,
        }
    }

    fn chain_graph() -> Graph {
        let mut contigs = SequenceStore::new();
        for id in ["c1", "c2"] {
            contigs.insert(id.to_string(), Rc::new(Sequence { id: id.to_string(), bases: vec![b'A'; 10_000] }));
        }
        let make = |q: &str, t: &str| PafRecord {
            qname: q.into(),
            qlen: 10_000,
            qstart: 8_000,
            qend: 10_000,
            orientation: Orientation::Forward,
            tname: t.into(),
            tlen: 10_000,
            tstart: 0,
            tend: 2_000,
            matches: 1_900,
            block_len: 2_000,
        };
        let overlaps = vec![Overlap::from_paf(&make("c1", "c2"))];
        build_graph(&contigs, &SequenceStore::new(), overlaps, vec![], &cfg())
    }

    #[test]
    fn max_os_walk_follows_chain() {
        let graph = chain_graph();
        let path = max_os_walk(&graph, "c1+", &cfg());
        assert_eq!(path.nodes, vec!["c1+", "c2+"]);
    }

    /// A walk that reaches an anchor node stops there even though that
    /// anchor has further outgoing edges of its own (spec section 4.3's
    /// termination rule) — the longer anchor chain is assembled later by
    /// scaffold chaining (component C5), not by the path generator.
    #[test]
    fn walk_stops_at_first_anchor_even_with_edges_beyond_it() {
        let mut contigs = SequenceStore::new();
        for id in ["c1", "c2", "c3"] {
            contigs.insert(id.to_string(), Rc::new(Sequence { id: id.to_string(), bases: vec![b'A'; 10_000] }));
        }
        let make = |q: &str, t: &str| PafRecord {
            qname: q.into(),
            qlen: 10_000,
            qstart: 8_000,
            qend: 10_000,
            orientation: Orientation::Forward,
            tname: t.into(),
            tlen: 10_000,
            tstart: 0,
            tend: 2_000,
            matches: 1_900,
            block_len: 2_000,
        };
        let overlaps = vec![Overlap::from_paf(&make("c1", "c2")), Overlap::from_paf(&make("c2", "c3"))];
        let graph = build_graph(&contigs, &SequenceStore::new(), overlaps, vec![], &cfg());
        let path = max_os_walk(&graph, "c1+", &cfg());
        assert_eq!(path.nodes, vec!["c1+", "c2+"]);
    }

    #[test]
    fn walk_never_revisits_a_node() {
        let graph = chain_graph();
        let path = max_os_walk(&graph, "c1+", &cfg());
        let unique: HashSet<_> = path.nodes.iter().collect();
        assert_eq!(unique.len(), path.nodes.len());
    }

    #[test]
    fn monte_carlo_walk_is_reproducible_given_a_seed() {
        let graph = chain_graph();
        let mut rng1 = StdRng::seed_from_u64(cfg().rng_seed);
        let mut rng2 = StdRng::seed_from_u64(cfg().rng_seed);
        let p1 = monte_carlo_walk(&graph, "c1+", &cfg(), &mut rng1);
        let p2 = monte_carlo_walk(&graph, "c1+", &cfg(), &mut rng2);
        assert_eq!(p1.nodes, p2.nodes);
    }

    #[test]
    fn generate_paths_fills_the_monte_carlo_floor() {
        let graph = chain_graph();
        let mut c = cfg();
        c.min_mc_paths = 5;
        let (pool, stats) = generate_paths(&graph, &c);
        assert!(stats.monte_carlo >= 5);
        assert_eq!(pool.len(), stats.max_os + stats.max_es + stats.monte_carlo);
        assert!(pool.iter().all(|p| p.nodes.len() == 2));
    }

    /// Spec section 8 round-trip law: "Reversing a path twice returns an
    /// equivalent path (same edge list)".
    #[test]
    fn reversing_a_path_twice_is_a_no_op() {
        let graph = chain_graph();
        let path = max_os_walk(&graph, "c1+", &cfg());
        let twice = path.reverse(&graph).reverse(&graph);

        assert_eq!(twice.nodes, path.nodes);
        assert_eq!(twice.length, path.length);
        assert_eq!(twice.direction, path.direction);
        let orig: Vec<(&str, &str)> = path.edges.iter().map(|e| (e.start.as_str(), e.end.as_str())).collect();
        let round_tripped: Vec<(&str, &str)> = twice.edges.iter().map(|e| (e.start.as_str(), e.end.as_str())).collect();
        assert_eq!(round_tripped, orig);
    }

    /// Spec section 4.4 step 1: a LEFT-oriented path (its first edge has
    /// `QES1 > QES2`) must be replaced by its reversed, RIGHT-oriented form
    /// before grouping.
    #[test]
    fn normalize_directions_flips_left_paths_to_right() {
        let graph = chain_graph();
        let left_edge = Edge {
            start: "c1+".into(),
            end: "c2+".into(),
            s_start: 600,
            s_end: 1_000,
            e_start: 0,
            e_end: 400,
            s_len: 10_000,
            e_len: 10_000,
            prefix_len: 600,
            qes1: 600,
            qes2: 400,
            os: 10.0,
            es: 10.0,
            si: 0.9,
            classification: crate::overlap::Classification::Usable,
        };
        let left_path = finish(&graph, vec!["c1+".to_string(), "c2+".to_string()], vec![left_edge]);
        assert_eq!(left_path.direction, Direction::Left);

        let normalized = normalize_directions(&graph, vec![left_path]);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].direction, Direction::Right);
        assert_eq!(normalized[0].nodes, vec![rc_name("c2+"), rc_name("c1+")]);
    }
}
