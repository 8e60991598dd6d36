//! Strand-doubled overlap graph (spec section 4.2, component C3).
//!
//! Generalizes the teacher's `create_overlap_graph.rs` (`OverlapGraph`,
//! `Node`, `EdgeInfo`, `+`/`-` suffix strand doubling) from a single node
//! namespace into the spec's two namespaces (anchor vs. read), and from
//! `EdgeInfo`'s four fields into the full edge geometry the spec requires.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::debug;

use crate::config::Config;
use crate::overlap::{Classification, Orientation, Overlap};
use crate::sequence::{Sequence, SequenceStore};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Anchor,
    Read,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strand {
    Fwd,
    Rc,
}

/// Flips the trailing `+`/`-` strand suffix of a node name.
pub fn rc_name(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('+') {
        format!("{stem}-")
    } else if let Some(stem) = name.strip_suffix('-') {
        format!("{stem}+")
    } else {
        panic!("node name '{name}' has no strand suffix")
    }
}

#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub strand: Strand,
    pub seq: Rc<Sequence>,
    pub out_edges: Vec<Edge>,
}

/// A directed edge from `start` to `end`. Geometry fields follow spec
/// section 3's naming: `SStart`/`SEnd` locate the alignment on the start
/// node's own strand, `EStart`/`EEnd` on the end node's; `QES1`/`QES2` are
/// the left/right extension lengths on the start node used by the grouping
/// stage (section 4.4) to decide LEFT/RIGHT direction.
#[derive(Clone, Debug)]
pub struct Edge {
    pub start: String,
    pub end: String,
    pub s_start: i64,
    pub s_end: i64,
    pub e_start: i64,
    pub e_end: i64,
    pub s_len: i64,
    pub e_len: i64,
    pub prefix_len: i64,
    pub qes1: i64,
    pub qes2: i64,
    pub os: f64,
    pub es: f64,
    pub si: f64,
    pub classification: Classification,
}

impl Edge {
    pub fn is_usable(&self) -> bool {
        self.classification == Classification::Usable
    }

    /// The mirror edge reached by walking the same overlap on the opposite
    /// strand (spec section 3's "Reversed path": "invert the edge list and
    /// swap each edge's start/end geometry; semantically the same walk on
    /// the opposite strand"). Computed analytically from this edge's own
    /// geometry rather than looked up in the graph, since the end node's
    /// mirror edge may not have survived per-edge reclassification (section
    /// 4.2 step 3) even though this edge did — asymmetric survival is the
    /// normal case whenever the two endpoints differ in length, not a graph
    /// defect.
    pub fn mirrored(&self) -> Edge {
        let s_start = self.e_len - self.e_end;
        let s_end = self.e_len - self.e_start;
        let e_start = self.s_len - self.s_end;
        let e_end = self.s_len - self.s_start;
        Edge {
            start: rc_name(&self.end),
            end: rc_name(&self.start),
            s_start,
            s_end,
            e_start,
            e_end,
            s_len: self.e_len,
            e_len: self.s_len,
            prefix_len: s_start - e_start,
            qes1: s_start,
            qes2: self.e_start,
            os: self.os,
            es: self.es,
            si: self.si,
            classification: self.classification,
        }
    }
}

#[derive(Default, Debug, Clone)]
pub struct EdgeStats {
    pub usable: u64,
    pub contained: u64,
    pub short: u64,
    pub lowqual: u64,
    pub zero_ext: u64,
    pub skipped_unknown_name: u64,
}

impl EdgeStats {
    fn count(&mut self, c: Classification) {
        match c {
            Classification::Usable => self.usable += 1,
            Classification::Contained => self.contained += 1,
            Classification::Short => self.short += 1,
            Classification::LowQual => self.lowqual += 1,
            Classification::ZeroExt => self.zero_ext += 1,
        }
    }
}

#[derive(Debug)]
pub struct Graph {
    pub anchors: BTreeMap<String, Node>,
    pub reads: BTreeMap<String, Node>,
    pub stats: EdgeStats,
}

impl Graph {
    fn node_kind_of(&self, base_name: &str) -> Option<NodeKind> {
        if self.anchors.contains_key(&format!("{base_name}+")) {
            Some(NodeKind::Anchor)
        } else if self.reads.contains_key(&format!("{base_name}+")) {
            Some(NodeKind::Read)
        } else {
            None
        }
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.anchors.get(name).or_else(|| self.reads.get(name))
    }

    fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.anchors.contains_key(name) {
            self.anchors.get_mut(name)
        } else {
            self.reads.get_mut(name)
        }
    }

    fn push_edge(&mut self, e: Edge) {
        if let Some(n) = self.node_mut(&e.start) {
            // Dedup: keep only the best-scoring edge to a given target,
            // matching the teacher's `add_edge` dedup-by-target guard.
            if let Some(existing) = n.out_edges.iter_mut().find(|x| x.end == e.end) {
                if e.os > existing.os {
                    *existing = e;
                }
            } else {
                n.out_edges.push(e);
            }
        }
    }

    pub fn isolated_count(&self) -> usize {
        self.anchors
            .values()
            .chain(self.reads.values())
            .filter(|n| n.out_edges.is_empty())
            .count()
    }

    /// Mirrors the original's `print()`/`printGraph()` structured dump
    /// (spec-full section H.2), logged at VERBOSE between phases.
    pub fn log_summary(&self) {
        debug!(
            "graph: {} anchor nodes, {} read nodes, {} isolated",
            self.anchors.len(),
            self.reads.len(),
            self.isolated_count()
        );
        debug!(
            "edges: usable={} contained={} short={} lowqual={} zero_ext={} skipped(unknown-name)={}",
            self.stats.usable,
            self.stats.contained,
            self.stats.short,
            self.stats.lowqual,
            self.stats.zero_ext,
            self.stats.skipped_unknown_name,
        );
    }
}

/// One endpoint role: a node name plus the alignment interval on that
/// node's own strand.
struct Role {
    name: String,
    b: i64,
    e: i64,
    l: i64,
}

fn orientation_sign(o: Orientation) -> char {
    match o {
        Orientation::Forward => '+',
        Orientation::Reverse => '-',
    }
}
fn flip_sign(c: char) -> char {
    if c == '+' { '-' } else { '+' }
}

/// Builds the two directed (start, end) role pairs an overlap induces: the
/// primary pair and its reverse-complement mirror. Generalizes both of the
/// teacher's `b1 > b2` / `else` branches into one formula.
fn candidate_roles(ov: &Overlap) -> ((Role, Role), (Role, Role)) {
    let o_sign = orientation_sign(ov.orientation);
    let rc_sign = flip_sign(o_sign);

    let q_plus = Role { name: format!("{}+", ov.qname), b: ov.qstart, e: ov.qend, l: ov.qlen as i64 };
    let q_minus = Role {
        name: format!("{}-", ov.qname),
        b: ov.qlen as i64 - ov.qend,
        e: ov.qlen as i64 - ov.qstart,
        l: ov.qlen as i64,
    };
    let t_oriented = Role {
        name: format!("{}{o_sign}", ov.tname),
        b: ov.tstart_adj,
        e: ov.tend_adj,
        l: ov.tlen as i64,
    };
    let t_rc = Role {
        name: format!("{}{rc_sign}", ov.tname),
        b: ov.tlen as i64 - ov.tend_adj,
        e: ov.tlen as i64 - ov.tstart_adj,
        l: ov.tlen as i64,
    };

    if ov.qstart > ov.tstart_adj {
        ((q_plus, t_oriented), (t_rc, q_minus))
    } else {
        ((t_oriented, q_plus), (q_minus, t_rc))
    }
}

fn build_edge(start: Role, end: Role, ov: &Overlap) -> Edge {
    let prefix_len = start.b - end.b;
    let qes1 = start.b;
    let qes2 = start.l - start.e;
    let overhang = ov.overhang();
    let es = prefix_len as f64 * ov.si - overhang as f64;
    Edge {
        start: start.name,
        end: end.name,
        s_start: start.b,
        s_end: start.e,
        e_start: end.b,
        e_end: end.e,
        s_len: start.l,
        e_len: end.l,
        prefix_len,
        qes1,
        qes2,
        os: ov.overlap_score(),
        es,
        si: ov.si,
        classification: Classification::Usable, // filled in by classify_edge
    }
}

fn classify_edge(edge: &Edge, ov: &Overlap, cfg: &Config) -> Classification {
    if let Some(c) = ov.gate(cfg) {
        return c;
    }
    if edge.prefix_len <= 0 {
        Classification::ZeroExt
    } else {
        Classification::Usable
    }
}

/// Builds strand-doubled nodes for every sequence in `store` into `dest`.
fn add_nodes(dest: &mut BTreeMap<String, Node>, store: &SequenceStore, kind: NodeKind) {
    for (id, seq) in store.iter() {
        dest.insert(
            format!("{id}+"),
            Node { name: format!("{id}+"), kind, strand: Strand::Fwd, seq: seq.clone(), out_edges: Vec::new() },
        );
        dest.insert(
            format!("{id}-"),
            Node { name: format!("{id}-"), kind, strand: Strand::Rc, seq: seq.clone(), out_edges: Vec::new() },
        );
    }
}

/// Builds the graph from loaded sequences and two overlap lists (read-to-
/// contig and read-to-read), per spec section 4.2.
pub fn build_graph(
    contigs: &SequenceStore,
    reads: &SequenceStore,
    r2c: Vec<Overlap>,
    r2r: Vec<Overlap>,
    cfg: &Config,
) -> Graph {
    let mut graph = Graph { anchors: BTreeMap::new(), reads: BTreeMap::new(), stats: EdgeStats::default() };
    add_nodes(&mut graph.anchors, contigs, NodeKind::Anchor);
    add_nodes(&mut graph.reads, reads, NodeKind::Read);

    for ov in r2c.into_iter().chain(r2r.into_iter()) {
        if graph.node_kind_of(&ov.qname).is_none() || graph.node_kind_of(&ov.tname).is_none() {
            graph.stats.skipped_unknown_name += 1;
            continue;
        }
        if let Some(c) = ov.gate(cfg) {
            // Gate classification applies uniformly to both candidate edges.
            graph.stats.count(c);
            graph.stats.count(c);
            continue;
        }

        let ((s1, e1), (s2, e2)) = candidate_roles(&ov);
        for (start, end) in [(s1, e1), (s2, e2)] {
            let mut edge = build_edge(start, end, &ov);
            edge.classification = classify_edge(&edge, &ov, cfg);
            graph.stats.count(edge.classification);
            if edge.is_usable() {
                graph.push_edge(edge);
            }
        }
    }

    // Sort every outgoing edge list by target name so downstream walks are
    // reproducible regardless of PAF input ordering (spec sections 5/9).
    for node in graph.anchors.values_mut().chain(graph.reads.values_mut()) {
        node.out_edges.sort_by(|a, b| a.end.cmp(&b.end));
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::DebugLevel;

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
            max_walk_nodes: 64,
            rng_seed: 42,
            debug_level: DebugLevel::Silent,
            dump_overlaps: None,
        }
    }

    fn seq(id: &str, len: usize) -> Rc<Sequence> {
        Rc::new(Sequence { id: id.to_string(), bases: vec![b'A'; len] })
    }

    #[test]
    fn rc_name_flips_suffix() {
        assert_eq!(rc_name("ctg1+"), "ctg1-");
        assert_eq!(rc_name("ctg1-"), "ctg1+");
    }

    #[test]
    fn strand_doubling_creates_both_nodes() {
        let mut store = SequenceStore::new();
        store.insert("c1".into(), seq("c1", 1000));
        let mut anchors = BTreeMap::new();
        add_nodes(&mut anchors, &store, NodeKind::Anchor);
        assert!(anchors.contains_key("c1+"));
        assert!(anchors.contains_key("c1-"));
    }

    #[test]
    fn usable_overlap_creates_mirrored_edges() {
        let mut contigs = SequenceStore::new();
        contigs.insert("c1".into(), seq("c1", 10_000));
        contigs.insert("c2".into(), seq("c2", 10_000));

        let r = crate::overlap::PafRecord {
            qname: "c1".into(),
            qlen: 10_000,
            qstart: 8_000,
            qend: 10_000,
            orientation: Orientation::Forward,
            tname: "c2".into(),
            tlen: 10_000,
            tstart: 0,
            tend: 2_000,
            matches: 1_900,
            block_len: 2_000,
        };
        let ov = Overlap::from_paf(&r);
        let reads = SequenceStore::new();
        let graph = build_graph(&contigs, &reads, vec![ov], vec![], &cfg());

        assert_eq!(graph.stats.usable, 2);
        assert!(graph.anchors["c1+"].out_edges.iter().any(|e| e.end == "c2+"));
        assert!(graph.anchors["c2-"].out_edges.iter().any(|e| e.end == "c1-"));
    }

    /// `mirrored()` is its own inverse: walking the mirror of the mirror
    /// reproduces the original edge's geometry exactly, independent of
    /// whether the graph itself ever attached that original edge.
    #[test]
    fn mirrored_is_involutive() {
        let e = Edge {
            start: "c1+".into(),
            end: "c2+".into(),
            s_start: 8_000,
            s_end: 10_000,
            e_start: 0,
            e_end: 2_500,
            s_len: 10_000,
            e_len: 6_000,
            prefix_len: 7_500,
            qes1: 8_000,
            qes2: 2_500,
            os: 2_250.0,
            es: 2_250.0,
            si: 0.93,
            classification: Classification::Usable,
        };

        let twice = e.mirrored().mirrored();

        assert_eq!(twice.start, e.start);
        assert_eq!(twice.end, e.end);
        assert_eq!(twice.s_start, e.s_start);
        assert_eq!(twice.s_end, e.s_end);
        assert_eq!(twice.e_start, e.e_start);
        assert_eq!(twice.e_end, e.e_end);
        assert_eq!(twice.s_len, e.s_len);
        assert_eq!(twice.e_len, e.e_len);
        assert_eq!(twice.prefix_len, e.prefix_len);
        assert_eq!(twice.qes1, e.qes1);
        assert_eq!(twice.qes2, e.qes2);
        assert_eq!(twice.classification, e.classification);
    }
}
