//! Pattern verification by raw byte search
//!
//! The file search ignores PDF structure completely. It will report a match
//! inside a compressed stream, a comment or the xref table just the same.

use crate::error::{PdfMarkError, Result};
use crate::graph::{ObjectGraph, StreamHandle};
use serde::Serialize;
use std::path::Path;

/// Every offset at which `needle` occurs in `haystack`, ascending.
///
/// After a match at `p` the search resumes at `p + 1`, so overlapping
/// occurrences are all reported. An empty needle matches nothing.
pub fn find_occurrences(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(pos, _)| pos)
        .collect()
}

/// Read a file and return the offsets of every occurrence of `pattern`.
///
/// Not finding the pattern is an empty result. Failing to read the file is a
/// [`PdfMarkError::LoadError`].
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn find_pattern_occurrences(path: impl AsRef<Path>, pattern: &[u8]) -> Result<Vec<usize>> {
    let path = path.as_ref();
    let content = std::fs::read(path).map_err(|e| PdfMarkError::LoadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let offsets = find_occurrences(&content, pattern);
    tracing::debug!(file_len = content.len(), found = offsets.len(), "Scanned file");
    Ok(offsets)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub offsets: Vec<usize>,
    pub expected_offset: Option<usize>,
}

impl VerificationReport {
    pub fn found(&self) -> bool {
        !self.offsets.is_empty()
    }

    /// Whether any occurrence sits exactly at the expected offset.
    pub fn matches_expected(&self) -> bool {
        self.expected_offset
            .is_some_and(|expected| self.offsets.contains(&expected))
    }
}

/// File search plus an optional check against a known offset.
pub fn verify_file(
    path: impl AsRef<Path>,
    pattern: &[u8],
    expected_offset: Option<usize>,
) -> Result<VerificationReport> {
    let offsets = find_pattern_occurrences(path, pattern)?;
    Ok(VerificationReport {
        offsets,
        expected_offset,
    })
}

/// An occurrence inside a stream's raw content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamOccurrence {
    pub stream: StreamHandle,
    pub offset: usize,
}

/// Search every stream's raw bytes, in graph order.
///
/// Offsets are relative to the start of each stream's content, which is
/// what [`crate::patcher::patch_stream`] reports.
pub fn find_in_streams<G: ObjectGraph + ?Sized>(graph: &G, pattern: &[u8]) -> Vec<StreamOccurrence> {
    graph
        .streams()
        .into_iter()
        .flat_map(|stream| {
            let content = graph.raw_bytes(stream).unwrap_or_default();
            find_occurrences(content, pattern)
                .into_iter()
                .map(move |offset| StreamOccurrence { stream, offset })
        })
        .collect()
}
