//! Carrier stream selection
//!
//! Font programs are preferred because they are large binary blobs that
//! viewers never render byte-for-byte. When no stream declares `/Type /Font`
//! the first stream of any kind is used instead.

use crate::error::{PdfMarkError, Result};
use crate::graph::{ObjectGraph, StreamHandle};

pub const FONT_TYPE: &str = "Font";

/// Find the stream that will carry the pattern.
///
/// Two passes over the graph's native order: first `Font` stream wins,
/// otherwise first stream of any type. No scoring beyond that.
#[tracing::instrument(skip_all)]
pub fn find_carrier_stream<G: ObjectGraph + ?Sized>(graph: &G) -> Result<StreamHandle> {
    let streams = graph.streams();

    if let Some(&handle) = streams.iter().find(|&&h| is_font_stream(graph, h)) {
        tracing::debug!(%handle, "Using font stream as carrier");
        return Ok(handle);
    }

    match streams.first() {
        Some(&handle) => {
            tracing::debug!(%handle, "No font stream, falling back to first stream");
            Ok(handle)
        }
        None => Err(PdfMarkError::NoCarrierFound),
    }
}

pub(crate) fn is_font_stream<G: ObjectGraph + ?Sized>(graph: &G, handle: StreamHandle) -> bool {
    graph.stream_type(handle).as_deref() == Some(FONT_TYPE)
}
