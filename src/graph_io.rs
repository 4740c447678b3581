//! Binary edge-list reader and writer
//!
//! The file holds 64-bit native-endian integers with no padding:
//!
//! ```text
//! [node_count][edge_count][src_0 .. src_{E-1}][dst_0 .. dst_{E-1}]
//! ```
//!
//! The producer writes only the lower triangle (`dst < src`), each
//! undirected edge once. The declared counts are checked against the file
//! length before any edge is read.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::matrix::{MatrixBuilder, ShardedSparseMatrix};
use crate::Scalar;

const WORD: u64 = std::mem::size_of::<u64>() as u64;
const HEADER_BYTES: u64 = 2 * WORD;

/// Declared sizes at the start of a binary edge list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeListHeader {
    /// Number of vertices (matrix rows)
    pub n_nodes: u64,
    /// Number of edges that follow
    pub n_edges: u64,
}

impl EdgeListHeader {
    /// Counts are written as signed 64-bit integers; a set top bit is a
    /// negative count
    pub fn check_sign(&self) -> Result<()> {
        for (what, value) in [("node count", self.n_nodes), ("edge count", self.n_edges)] {
            if value > i64::MAX as u64 {
                return Err(Error::invalid_size(format!(
                    "negative {} {}",
                    what, value as i64
                )));
            }
        }
        Ok(())
    }

    /// File length implied by the header, `None` on overflow
    pub fn expected_len(&self) -> Option<u64> {
        self.n_edges
            .checked_mul(2 * WORD)
            .and_then(|body| body.checked_add(HEADER_BYTES))
    }
}

/// An in-memory edge list: `src[e] -> dst[e]` for every edge `e`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeList {
    /// Number of vertices
    pub n_nodes: usize,
    /// Source (row) of every edge
    pub src: Vec<usize>,
    /// Destination (column) of every edge
    pub dst: Vec<usize>,
}

fn read_word<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; WORD as usize];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_ne_bytes(buf))
}

fn read_words<R: Read>(reader: &mut R, count: usize) -> Result<Vec<usize>> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let word = read_word(reader)?;
        // Values past usize::MAX can never be valid row indices
        out.push(usize::try_from(word).unwrap_or(usize::MAX));
    }
    Ok(out)
}

fn to_usize(value: u64, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::invalid_size(format!("{} {} does not fit in memory", what, value)))
}

impl EdgeList {
    /// Creates an edge list from `(src, dst)` pairs
    pub fn from_pairs(n_nodes: usize, pairs: &[(usize, usize)]) -> Self {
        let (src, dst) = pairs.iter().copied().unzip();
        Self { n_nodes, src, dst }
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// Whether there are no edges
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Edges as `(src, dst)` pairs
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.src.iter().copied().zip(self.dst.iter().copied()).collect()
    }

    /// Number of edges that are not strictly lower triangular
    pub fn count_upper(&self) -> usize {
        self.src
            .iter()
            .zip(&self.dst)
            .filter(|&(&s, &d)| d >= s)
            .count()
    }

    /// Reads only the header of a binary edge list
    pub fn read_header<P: AsRef<Path>>(path: P) -> Result<EdgeListHeader> {
        let mut reader = BufReader::new(File::open(path)?);
        Ok(EdgeListHeader {
            n_nodes: read_word(&mut reader)?,
            n_edges: read_word(&mut reader)?,
        })
    }

    /// Reads a binary edge list, validating the header against the file size
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let actual = file.metadata()?.len();

        if actual < HEADER_BYTES {
            return Err(Error::HeaderMismatch {
                nodes: 0,
                edges: 0,
                expected: HEADER_BYTES,
                actual,
            });
        }

        let mut reader = BufReader::new(file);
        let header = EdgeListHeader {
            n_nodes: read_word(&mut reader)?,
            n_edges: read_word(&mut reader)?,
        };

        header.check_sign()?;

        let expected = header.expected_len().unwrap_or(u64::MAX);
        if expected != actual {
            return Err(Error::HeaderMismatch {
                nodes: header.n_nodes,
                edges: header.n_edges,
                expected,
                actual,
            });
        }

        let n_nodes = to_usize(header.n_nodes, "node count")?;
        let n_edges = to_usize(header.n_edges, "edge count")?;

        let src = read_words(&mut reader, n_edges)?;
        let dst = read_words(&mut reader, n_edges)?;

        let edges = Self { n_nodes, src, dst };
        log::debug!(
            "read {} nodes and {} edges from {}",
            edges.n_nodes,
            edges.len(),
            path.display()
        );

        let upper = edges.count_upper();
        if upper > 0 {
            log::warn!(
                "{}: {} edges are not strictly lower triangular",
                path.display(),
                upper
            );
        }

        Ok(edges)
    }

    /// Writes the edge list in the binary format read by [`EdgeList::read_from`]
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);

        writer.write_all(&(self.n_nodes as u64).to_ne_bytes())?;
        writer.write_all(&(self.len() as u64).to_ne_bytes())?;
        for &s in &self.src {
            writer.write_all(&(s as u64).to_ne_bytes())?;
        }
        for &d in &self.dst {
            writer.write_all(&(d as u64).to_ne_bytes())?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Builds the adjacency matrix `L`, one parallel build task per shard
    ///
    /// Every edge gets value one. Endpoints `>= n_nodes` fail with
    /// `Error::RangeError`.
    pub fn build_matrix(&self, n_shards: usize) -> Result<ShardedSparseMatrix<Scalar>> {
        MatrixBuilder::create(self.n_nodes, n_shards)?.build_sharded(&self.pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_then_read() {
        let edges = EdgeList::from_pairs(4, &[(1, 0), (2, 0), (3, 2)]);
        let temp_file = NamedTempFile::new().unwrap();

        edges.write_to(temp_file.path()).unwrap();
        let len = std::fs::metadata(temp_file.path()).unwrap().len();
        assert_eq!(len, 16 + 16 * 3);

        let header = EdgeList::read_header(temp_file.path()).unwrap();
        assert_eq!(header, EdgeListHeader { n_nodes: 4, n_edges: 3 });

        let back = EdgeList::read_from(temp_file.path()).unwrap();
        assert_eq!(back, edges);
    }

    #[test]
    fn test_header_overflow() {
        let header = EdgeListHeader {
            n_nodes: 1,
            n_edges: u64::MAX,
        };
        assert_eq!(header.expected_len(), None);
    }

    #[test]
    fn test_negative_counts_rejected() {
        let header = EdgeListHeader {
            n_nodes: -1i64 as u64,
            n_edges: 0,
        };
        assert!(matches!(header.check_sign(), Err(Error::InvalidSize { .. })));

        let header = EdgeListHeader {
            n_nodes: 4,
            n_edges: -3i64 as u64,
        };
        assert!(matches!(header.check_sign(), Err(Error::InvalidSize { .. })));
        assert!(EdgeListHeader { n_nodes: 4, n_edges: 3 }.check_sign().is_ok());
    }

    #[test]
    fn test_count_upper() {
        let edges = EdgeList::from_pairs(3, &[(1, 0), (0, 2), (1, 1)]);
        assert_eq!(edges.count_upper(), 2);
    }

    #[test]
    fn test_build_matrix() {
        let edges = EdgeList::from_pairs(3, &[(1, 0), (2, 0), (2, 1)]);
        let l = edges.build_matrix(2).unwrap();
        assert_eq!(l.row(2).entries(), &[(0, 1), (1, 1)]);
        assert_eq!(l.max_degree(), 2);
    }
}
