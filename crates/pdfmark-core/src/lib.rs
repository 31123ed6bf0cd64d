//! Identifier marks hidden in PDF stream data
//!
//! This crate writes an 8-byte identifier pattern into the raw bytes of an
//! existing stream object (a font program when one exists) and finds it again
//! by plain byte search.
//!
//! - [`build_pattern`]: 3-byte payload to 8-byte pattern
//! - [`find_carrier_stream`] / [`patch_stream`]: choose a stream and overwrite bytes in place
//! - [`PdfDocument`]: lopdf-backed load and atomic save
//! - [`find_pattern_occurrences`]: raw byte search over a file
//! - [`analyze`]: stream and font counts for diagnostics
//!
//! ```no_run
//! use pdfmark_core::{build_pattern, find_pattern_occurrences, inject_pattern_into_pdf, InjectOptions};
//!
//! # fn example() -> Result<(), pdfmark_core::PdfMarkError> {
//! let pattern = build_pattern(b"GJW")?;
//! let report = inject_pattern_into_pdf("in.pdf", &pattern, "out.pdf", InjectOptions::default())?;
//! let offsets = find_pattern_occurrences("out.pdf", pattern.as_bytes())?;
//! assert!(!offsets.is_empty());
//! # let _ = report;
//! # Ok(())
//! # }
//! ```

pub mod analyze;
pub mod document;
pub mod error;
pub mod graph;
pub mod inject;
pub mod locator;
pub mod patcher;
pub mod pattern;
pub mod verify;

pub use analyze::{analyze, FontStreamInfo, StructureReport};
pub use document::{PdfDocument, STRUCTURAL_STREAM_TYPES};
pub use error::{PdfMarkError, Result};
pub use graph::{MemoryGraph, ObjectGraph, StreamHandle};
pub use inject::{inject_into_document, inject_pattern_into_pdf, InjectOptions, InjectionReport};
pub use locator::find_carrier_stream;
pub use patcher::{injection_offset, patch_stream, DEFAULT_TARGET_OFFSET};
pub use pattern::{build_pattern, Pattern, Payload, PATTERN_LEN, PAYLOAD_LEN};
pub use verify::{
    find_in_streams, find_occurrences, find_pattern_occurrences, verify_file, StreamOccurrence,
    VerificationReport,
};
