//! Stream structure summary, used for diagnostics before and after injection.

use crate::graph::{ObjectGraph, StreamHandle};
use crate::locator::is_font_stream;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontStreamInfo {
    pub handle: StreamHandle,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    pub stream_count: usize,
    pub font_stream_count: usize,
    pub font_streams: Vec<FontStreamInfo>,
}

pub fn analyze<G: ObjectGraph + ?Sized>(graph: &G) -> StructureReport {
    let streams = graph.streams();
    let font_streams: Vec<FontStreamInfo> = streams
        .iter()
        .filter(|&&h| is_font_stream(graph, h))
        .map(|&handle| FontStreamInfo {
            handle,
            size: graph.raw_bytes(handle).map_or(0, <[u8]>::len),
        })
        .collect();

    StructureReport {
        stream_count: streams.len(),
        font_stream_count: font_streams.len(),
        font_streams,
    }
}
