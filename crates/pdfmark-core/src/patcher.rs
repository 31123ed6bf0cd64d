//! In-place stream patching
//!
//! The pattern overwrites existing bytes; it is never inserted. Stream length
//! stays the same, so neither `/Length` nor the cross-reference table has to
//! change.

use crate::error::{PdfMarkError, Result};
use crate::graph::{ObjectGraph, StreamHandle};

/// Where the pattern goes when the carrier is large enough (0x184B0).
pub const DEFAULT_TARGET_OFFSET: usize = 0x184B0;

/// Compute where a pattern of `pattern_len` bytes lands in a stream of
/// `content_len` bytes: `min(target, content_len - pattern_len)`.
///
/// Returns `None` when the stream is shorter than the pattern.
pub fn injection_offset(content_len: usize, pattern_len: usize, target: usize) -> Option<usize> {
    content_len
        .checked_sub(pattern_len)
        .map(|last_fit| target.min(last_fit))
}

/// Overwrite the carrier's raw bytes with `pattern` and return the offset used.
///
/// Fails with [`PdfMarkError::StreamTooSmall`] if the stream cannot hold the
/// pattern, leaving the stream untouched.
#[tracing::instrument(skip(graph, pattern, handle), fields(%handle, pattern_len = pattern.len()))]
pub fn patch_stream<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    handle: StreamHandle,
    pattern: &[u8],
    target_offset: usize,
) -> Result<usize> {
    let content = graph
        .raw_bytes_mut(handle)
        .ok_or(PdfMarkError::NoCarrierFound)?;
    let length = content.len();

    let offset = injection_offset(length, pattern.len(), target_offset).ok_or(
        PdfMarkError::StreamTooSmall {
            length,
            required: pattern.len(),
        },
    )?;

    content[offset..offset + pattern.len()].copy_from_slice(pattern);

    if offset != target_offset {
        tracing::warn!(
            length,
            target_offset,
            offset,
            "Carrier shorter than target offset, pattern clamped to end of stream"
        );
    }
    tracing::debug!(offset, length, "Patched carrier stream");
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;
    use crate::pattern::build_pattern;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offset_uses_target_when_stream_is_large() {
        assert_eq!(DEFAULT_TARGET_OFFSET, 99_504);
        assert_eq!(injection_offset(200_000, 8, DEFAULT_TARGET_OFFSET), Some(0x184B0));
        assert_eq!(injection_offset(200_000, 8, 100_016), Some(100_016));
    }

    #[test]
    fn test_offset_clamps_to_end_of_small_stream() {
        assert_eq!(injection_offset(50, 8, DEFAULT_TARGET_OFFSET), Some(42));
    }

    #[test]
    fn test_offset_exact_fit() {
        assert_eq!(injection_offset(8, 8, DEFAULT_TARGET_OFFSET), Some(0));
        assert_eq!(injection_offset(7, 8, DEFAULT_TARGET_OFFSET), None);
    }

    #[test]
    fn test_target_offset_boundary() {
        // pattern ends exactly at the end of the stream
        let len = DEFAULT_TARGET_OFFSET + 8;
        assert_eq!(injection_offset(len, 8, DEFAULT_TARGET_OFFSET), Some(DEFAULT_TARGET_OFFSET));
        assert_eq!(
            injection_offset(len - 1, 8, DEFAULT_TARGET_OFFSET),
            Some(DEFAULT_TARGET_OFFSET - 1)
        );
    }

    #[test]
    fn test_patch_large_stream_at_target() {
        let pattern = build_pattern(b"GJW").unwrap();
        let mut graph = MemoryGraph::new();
        let handle = graph.push(Some("Font"), vec![0u8; 200_000]);

        let offset = patch_stream(&mut graph, handle, pattern.as_bytes(), DEFAULT_TARGET_OFFSET)
            .unwrap();

        assert_eq!(offset, 0x184B0);
        let content = graph.raw_bytes(handle).unwrap();
        assert_eq!(content.len(), 200_000);
        assert_eq!(&content[0x184B0..0x184B0 + 8], pattern.as_bytes());
    }

    #[test]
    fn test_patch_small_stream_clamps() {
        let pattern = build_pattern(b"GJW").unwrap();
        let mut graph = MemoryGraph::new();
        let handle = graph.push(None, vec![0xAA; 50]);

        let offset = patch_stream(&mut graph, handle, pattern.as_bytes(), DEFAULT_TARGET_OFFSET)
            .unwrap();

        assert_eq!(offset, 42);
        let content = graph.raw_bytes(handle).unwrap();
        assert_eq!(&content[42..], pattern.as_bytes());
        assert!(content[..42].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_patch_too_small_stream_fails_without_mutation() {
        let pattern = build_pattern(b"GJW").unwrap();
        let mut graph = MemoryGraph::new();
        let handle = graph.push(None, vec![1, 2, 3, 4, 5, 6, 7]);

        let result = patch_stream(&mut graph, handle, pattern.as_bytes(), DEFAULT_TARGET_OFFSET);

        match result {
            Err(PdfMarkError::StreamTooSmall { length, required }) => {
                assert_eq!(length, 7);
                assert_eq!(required, 8);
            }
            other => panic!("expected StreamTooSmall, got {:?}", other),
        }
        assert_eq!(graph.raw_bytes(handle).unwrap(), &[1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_patch_twice_is_idempotent() {
        let pattern = build_pattern(b"GJW").unwrap();
        let mut graph = MemoryGraph::new();
        let handle = graph.push(None, (0..1000).map(|i| (i % 251) as u8).collect());

        patch_stream(&mut graph, handle, pattern.as_bytes(), 500).unwrap();
        let once = graph.raw_bytes(handle).unwrap().to_vec();
        patch_stream(&mut graph, handle, pattern.as_bytes(), 500).unwrap();

        assert_eq!(graph.raw_bytes(handle).unwrap(), once.as_slice());
    }
}
