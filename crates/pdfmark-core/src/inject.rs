//! Load, locate, patch and save in one call.

use crate::document::PdfDocument;
use crate::error::Result;
use crate::graph::{ObjectGraph, StreamHandle};
use crate::locator::find_carrier_stream;
use crate::patcher::{patch_stream, DEFAULT_TARGET_OFFSET};
use crate::pattern::Pattern;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectOptions {
    /// Preferred byte offset inside the carrier stream.
    pub target_offset: usize,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            target_offset: DEFAULT_TARGET_OFFSET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    pub carrier: StreamHandle,
    pub carrier_type: Option<String>,
    pub carrier_len: usize,
    /// Offset of the pattern inside the carrier's raw content.
    pub offset: usize,
    pub output: PathBuf,
}

/// Locate a carrier in an already loaded document and patch it.
///
/// Returns the carrier and the offset used; nothing is written to disk.
pub fn inject_into_document(
    document: &mut PdfDocument,
    pattern: &Pattern,
    options: InjectOptions,
) -> Result<(StreamHandle, usize)> {
    let carrier = find_carrier_stream(&*document)?;
    let offset = patch_stream(document, carrier, pattern.as_bytes(), options.target_offset)?;
    Ok((carrier, offset))
}

/// Write `pattern` into a copy of `input` saved at `output`.
///
/// The input file is only read. `output` is replaced atomically, so on error
/// whatever was there before is still intact.
#[tracing::instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub fn inject_pattern_into_pdf(
    input: impl AsRef<Path>,
    pattern: &Pattern,
    output: impl AsRef<Path>,
    options: InjectOptions,
) -> Result<InjectionReport> {
    let output = output.as_ref();
    let mut document = PdfDocument::load(input)?;

    let (carrier, offset) = inject_into_document(&mut document, pattern, options)?;
    let carrier_type = document.stream_type(carrier);
    let carrier_len = document.raw_bytes(carrier).map_or(0, <[u8]>::len);

    document.save(output)?;

    tracing::info!(%carrier, offset, carrier_len, "Injected pattern");
    Ok(InjectionReport {
        carrier,
        carrier_type,
        carrier_len,
        offset,
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::{create_streamless_pdf, create_test_pdf};
    use crate::error::PdfMarkError;
    use crate::pattern::build_pattern;

    #[test]
    fn test_inject_into_document_prefers_font() {
        let pattern = build_pattern(b"GJW").unwrap();
        let mut doc = PdfDocument::from_document(create_test_pdf(&[
            (None, vec![0u8; 64]),
            (Some("Font"), vec![0u8; 64]),
        ]));

        let (carrier, offset) =
            inject_into_document(&mut doc, &pattern, InjectOptions::default()).unwrap();

        assert_eq!(doc.stream_type(carrier).as_deref(), Some("Font"));
        assert_eq!(offset, 56);
        assert_eq!(&doc.raw_bytes(carrier).unwrap()[56..], pattern.as_bytes());
    }

    #[test]
    fn test_inject_into_streamless_document_fails() {
        let pattern = build_pattern(b"GJW").unwrap();
        let mut doc = PdfDocument::from_document(create_streamless_pdf());
        let result = inject_into_document(&mut doc, &pattern, InjectOptions::default());
        assert!(matches!(result, Err(PdfMarkError::NoCarrierFound)));
    }

    #[test]
    fn test_default_target_offset() {
        assert_eq!(InjectOptions::default().target_offset, 0x184B0);
    }
}
