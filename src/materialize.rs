//! Sequence materialization (spec section 4.5, component C6).
//!
//! Generalizes `compress_graph.rs::build_unitig_sequence` (splice a prefix,
//! then append the final member whole) from unitig-member splicing to
//! edge-geometry splicing, and its `reverse_complement`/`rc_if_needed`
//! helpers to per-node strand materialization. The scaffold header format
//! and the unused-contig pass-through loop follow
//! `original_source/src/SBridger.cpp::generateSequences`
//! (`header`/`usedContigs` bookkeeping).

use std::collections::BTreeSet;
use std::io::Write;

use crate::error::{Result, ScaraError};
use crate::graph::{Graph, Node, Strand};
use crate::scaffold::Scaffold;
use crate::sequence::SequenceStore;

fn complement(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'a' => b't',
        b'T' => b'A',
        b't' => b'a',
        b'C' => b'G',
        b'c' => b'g',
        b'G' => b'C',
        b'g' => b'c',
        other => other,
    }
}

fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases.iter().rev().map(|b| complement(*b)).collect()
}

/// A node's sequence in its own strand's coordinate frame. `Sequence` data
/// is always stored forward; an RC node's bases are computed on demand.
fn oriented_bases(node: &Node) -> Vec<u8> {
    match node.strand {
        Strand::Fwd => node.seq.bases.clone(),
        Strand::Rc => reverse_complement(&node.seq.bases),
    }
}

fn base_name(node_name: &str) -> &str {
    node_name.trim_end_matches(['+', '-'])
}

/// Splices a scaffold's sequence: each edge along the chain contributes its
/// start node's prefix (`SStart - EStart` bases, spec section 4.5), and the
/// chain's final node contributes its full sequence.
pub fn materialize_scaffold(scaffold: &Scaffold, graph: &Graph) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for segment in &scaffold.segments {
        for edge in &segment.edges {
            if edge.prefix_len <= 0 {
                return Err(ScaraError::ClassificationMismatch {
                    start: edge.start.clone(),
                    end: edge.end.clone(),
                    prefix_len: edge.prefix_len,
                });
            }
            let node = graph
                .node(&edge.start)
                .ok_or_else(|| ScaraError::InvariantBreach(format!("missing node {}", edge.start)))?;
            let bases = oriented_bases(node);
            let take = (edge.prefix_len as usize).min(bases.len());
            out.extend_from_slice(&bases[..take]);
        }
    }
    let last_name = scaffold
        .segments
        .last()
        .expect("a scaffold always has at least one segment")
        .end_node();
    let last_node = graph
        .node(last_name)
        .ok_or_else(|| ScaraError::InvariantBreach(format!("missing node {last_name}")))?;
    out.extend_from_slice(&oriented_bases(last_node));
    Ok(out)
}

fn write_fasta_record(w: &mut impl Write, header: &str, bases: &[u8]) -> Result<()> {
    writeln!(w, ">{header}")?;
    w.write_all(bases)?;
    writeln!(w)?;
    Ok(())
}

/// Writes every scaffold as a FASTA record, headered
/// `Scaffold_<k> <anchor1> <anchor2> ...` per
/// `SBridger::generateSequences`'s header construction, then passes through
/// every contig that no scaffold consumed, untouched, in its original
/// orientation.
pub fn write_all(
    w: &mut impl Write,
    scaffolds: &[Scaffold],
    graph: &Graph,
    contigs: &SequenceStore,
) -> Result<()> {
    let mut used_contigs: BTreeSet<String> = BTreeSet::new();

    for (idx, scaffold) in scaffolds.iter().enumerate() {
        for n in scaffold.anchor_trace(graph) {
            used_contigs.insert(base_name(&n).to_string());
        }
        let header = format!("Scaffold_{} {}", idx + 1, scaffold.full_trace().join(" "));
        let bases = materialize_scaffold(scaffold, graph)?;
        write_fasta_record(w, &header, &bases)?;
    }

    for (id, seq) in contigs.iter() {
        if !used_contigs.contains(id) {
            write_fasta_record(w, id, &seq.bases)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_complement_flips_and_complements() {
        assert_eq!(reverse_complement(b"ACGT"), b"ACGT");
        assert_eq!(reverse_complement(b"AACC"), b"GGTT");
    }

    #[test]
    fn base_name_strips_strand_suffix() {
        assert_eq!(base_name("ctg1+"), "ctg1");
        assert_eq!(base_name("ctg1-"), "ctg1");
    }
}
