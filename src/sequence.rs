//! Sequence store (spec section 3 "Sequence", component C1).
//!
//! Loads contigs (FASTA) and reads (FASTQ), transparently unwrapping gzip
//! input. Neither format is in the spec's scope, so this follows the
//! teacher's own line-oriented, split-on-delimiter parsing style rather than
//! reaching for a dedicated bioinformatics crate.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::rc::Rc;

use flate2::read::MultiGzDecoder;

use crate::error::{Result, ScaraError};

/// An immutable contig or read sequence, shared by `Rc` across every node
/// (FWD and RC) derived from it so the base string is never copied.
#[derive(Debug)]
pub struct Sequence {
    pub id: String,
    pub bases: Vec<u8>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

pub type SequenceStore = BTreeMap<String, Rc<Sequence>>;

pub(crate) fn open_maybe_gzip(path: &str) -> Result<Box<dyn BufRead>> {
    let mut file = File::open(Path::new(path))?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic).unwrap_or(0);
    file.seek(SeekFrom::Start(0))?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn first_id_token(header: &str) -> &str {
    header.split_whitespace().next().unwrap_or("")
}

/// Loads a FASTA file into a sequence store keyed by the identifier token
/// (the part of the header line before the first whitespace).
pub fn load_fasta(path: &str) -> Result<SequenceStore> {
    let reader = open_maybe_gzip(path)?;
    let mut store = SequenceStore::new();
    let mut cur_id: Option<String> = None;
    let mut cur_seq: Vec<u8> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('>') {
            if let Some(id) = cur_id.take() {
                store.insert(id.clone(), Rc::new(Sequence { id, bases: std::mem::take(&mut cur_seq) }));
            }
            let id = first_id_token(rest).to_string();
            if id.is_empty() {
                return Err(ScaraError::Parse {
                    kind: "fasta",
                    path: path.to_string(),
                    line: line_no,
                    message: "empty sequence identifier".into(),
                });
            }
            cur_id = Some(id);
        } else {
            if cur_id.is_none() {
                return Err(ScaraError::Parse {
                    kind: "fasta",
                    path: path.to_string(),
                    line: line_no,
                    message: "sequence data before first header".into(),
                });
            }
            cur_seq.extend_from_slice(line.as_bytes());
        }
    }
    if let Some(id) = cur_id.take() {
        store.insert(id.clone(), Rc::new(Sequence { id, bases: cur_seq }));
    }
    Ok(store)
}

fn next_line(
    lines: &mut io::Lines<Box<dyn BufRead>>,
    path: &str,
    line_no: &mut usize,
    what: &'static str,
) -> Result<Option<String>> {
    match lines.next() {
        Some(l) => {
            *line_no += 1;
            Ok(Some(l?))
        }
        None => {
            if what.is_empty() {
                Ok(None)
            } else {
                Err(ScaraError::Parse {
                    kind: "fastq",
                    path: path.to_string(),
                    line: *line_no + 1,
                    message: format!("truncated record (missing {what})"),
                })
            }
        }
    }
}

/// Loads a FASTQ file into a sequence store. Quality strings are read (to
/// stay in sync with the 4-line record framing) and discarded.
pub fn load_fastq(path: &str) -> Result<SequenceStore> {
    let reader = open_maybe_gzip(path)?;
    let mut store = SequenceStore::new();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    loop {
        let header = match next_line(&mut lines, path, &mut line_no, "")? {
            Some(h) => h,
            None => break,
        };
        if header.is_empty() {
            continue;
        }
        let id = header
            .strip_prefix('@')
            .ok_or_else(|| ScaraError::Parse {
                kind: "fastq",
                path: path.to_string(),
                line: line_no,
                message: "expected '@' record header".into(),
            })?;
        let id = first_id_token(id).to_string();

        let seq_line = next_line(&mut lines, path, &mut line_no, "sequence line")?.unwrap();
        let plus_line = next_line(&mut lines, path, &mut line_no, "'+' separator line")?.unwrap();
        let _qual_line = next_line(&mut lines, path, &mut line_no, "quality line")?.unwrap();

        if !plus_line.starts_with('+') {
            return Err(ScaraError::Parse {
                kind: "fastq",
                path: path.to_string(),
                line: line_no - 1,
                message: "expected '+' separator line".into(),
            });
        }
        store.insert(id.clone(), Rc::new(Sequence { id, bases: seq_line.into_bytes() }));
    }
    Ok(store)
}
