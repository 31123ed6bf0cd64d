//! Object graph capability
//!
//! The locator, patcher and analyzer only need four things from a PDF
//! backend: enumerate stream objects in a stable order, read each stream's
//! declared `/Type`, and read or overwrite its raw (still encoded) bytes.
//! [`ObjectGraph`] captures exactly that so the selection and patching rules
//! do not depend on how a particular library stores its object table.

use serde::Serialize;
use std::fmt;

/// Opaque reference to a stream object inside an [`ObjectGraph`].
///
/// For PDF-backed graphs this is the indirect object id `(number, generation)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StreamHandle {
    pub number: u32,
    pub generation: u16,
}

impl StreamHandle {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl From<lopdf::ObjectId> for StreamHandle {
    fn from((number, generation): lopdf::ObjectId) -> Self {
        Self { number, generation }
    }
}

impl From<StreamHandle> for lopdf::ObjectId {
    fn from(handle: StreamHandle) -> Self {
        (handle.number, handle.generation)
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

pub trait ObjectGraph {
    /// All stream objects, in the graph's native enumeration order.
    ///
    /// The order must be stable for an unmodified graph; first-match
    /// selection relies on it.
    fn streams(&self) -> Vec<StreamHandle>;

    /// The `/Type` name declared in the stream dictionary, if any.
    fn stream_type(&self, handle: StreamHandle) -> Option<String>;

    /// Raw stream bytes as stored in the file (no filters applied).
    fn raw_bytes(&self, handle: StreamHandle) -> Option<&[u8]>;

    /// Mutable access to the raw stream bytes.
    ///
    /// Callers must not change the length: the graph's length metadata is
    /// not updated through this view.
    fn raw_bytes_mut(&mut self, handle: StreamHandle) -> Option<&mut [u8]>;
}

/// Simple in-memory graph, handy for exercising selection rules without
/// building a full PDF.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    entries: Vec<MemoryStream>,
}

#[derive(Debug, Clone)]
struct MemoryStream {
    handle: StreamHandle,
    type_tag: Option<String>,
    content: Vec<u8>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stream; handles are numbered from 1 in insertion order.
    pub fn push(&mut self, type_tag: Option<&str>, content: Vec<u8>) -> StreamHandle {
        let handle = StreamHandle::new(self.entries.len() as u32 + 1, 0);
        self.entries.push(MemoryStream {
            handle,
            type_tag: type_tag.map(str::to_string),
            content,
        });
        handle
    }

    fn entry(&self, handle: StreamHandle) -> Option<&MemoryStream> {
        self.entries.iter().find(|e| e.handle == handle)
    }
}

impl ObjectGraph for MemoryGraph {
    fn streams(&self) -> Vec<StreamHandle> {
        self.entries.iter().map(|e| e.handle).collect()
    }

    fn stream_type(&self, handle: StreamHandle) -> Option<String> {
        self.entry(handle).and_then(|e| e.type_tag.clone())
    }

    fn raw_bytes(&self, handle: StreamHandle) -> Option<&[u8]> {
        self.entry(handle).map(|e| e.content.as_slice())
    }

    fn raw_bytes_mut(&mut self, handle: StreamHandle) -> Option<&mut [u8]> {
        self.entries
            .iter_mut()
            .find(|e| e.handle == handle)
            .map(|e| e.content.as_mut_slice())
    }
}
