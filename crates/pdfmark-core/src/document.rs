//! PDF loading and serialization on top of lopdf
//!
//! Streams are kept exactly as they are stored in the file: nothing is
//! decompressed on load and nothing is recompressed on save, so a patched
//! stream is written back with the same `/Length` it was read with.
//!
//! Object streams and cross-reference streams are rebuilt by the writer
//! rather than copied, so they are never offered as carriers.

use crate::error::{PdfMarkError, Result};
use crate::graph::{ObjectGraph, StreamHandle};
use lopdf::{Document, Object, ObjectId};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stream `/Type` values that lopdf drops on save.
pub const STRUCTURAL_STREAM_TYPES: [&str; 2] = ["ObjStm", "XRef"];

/// A parsed PDF whose stream objects can be located and patched in place.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    inner: Document,
}

impl PdfDocument {
    /// Load and parse a PDF file.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path).map_err(|e| PdfMarkError::LoadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(objects = inner.objects.len(), "Loaded PDF");
        Ok(Self { inner })
    }

    /// Parse a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(bytes).map_err(|e| PdfMarkError::LoadError {
            path: PathBuf::from("<memory>"),
            reason: e.to_string(),
        })?;
        Ok(Self { inner })
    }

    /// Wrap an already constructed lopdf document.
    pub fn from_document(inner: Document) -> Self {
        Self { inner }
    }

    /// Serialize the current object graph to bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfMarkError::SaveError {
                path: PathBuf::from("<memory>"),
                reason: e.to_string(),
            })?;
        Ok(buffer)
    }

    /// Write the document to `path`.
    ///
    /// The PDF is serialized in memory first, written to a temporary file in
    /// the destination directory and renamed into place. Any existing file at
    /// `path` is left untouched when an error is returned.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let save_error = |reason: String| PdfMarkError::SaveError {
            path: path.to_path_buf(),
            reason,
        };

        let mut bytes = Vec::new();
        self.inner
            .save_to(&mut bytes)
            .map_err(|e| save_error(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| save_error(format!("Failed to create temporary file: {}", e)))?;
        temp.write_all(&bytes)
            .map_err(|e| save_error(format!("Failed to write PDF data: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| save_error(format!("Failed to flush PDF data: {}", e)))?;
        temp.persist(path)
            .map_err(|e| save_error(format!("Failed to move PDF into place: {}", e.error)))?;

        tracing::debug!(bytes = bytes.len(), "Saved PDF");
        Ok(())
    }

    fn stream(&self, handle: StreamHandle) -> Option<&lopdf::Stream> {
        let id: ObjectId = handle.into();
        match self.inner.objects.get(&id) {
            Some(Object::Stream(stream)) => Some(stream),
            _ => None,
        }
    }
}

impl ObjectGraph for PdfDocument {
    fn streams(&self) -> Vec<StreamHandle> {
        // lopdf keeps objects in a BTreeMap, so this is ascending object id.
        self.inner
            .objects
            .iter()
            .filter_map(|(&id, object)| match object {
                Object::Stream(stream) if !is_structural(stream) => Some(StreamHandle::from(id)),
                _ => None,
            })
            .collect()
    }

    fn stream_type(&self, handle: StreamHandle) -> Option<String> {
        match self.stream(handle)?.dict.get(b"Type") {
            Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }

    fn raw_bytes(&self, handle: StreamHandle) -> Option<&[u8]> {
        self.stream(handle).map(|s| s.content.as_slice())
    }

    fn raw_bytes_mut(&mut self, handle: StreamHandle) -> Option<&mut [u8]> {
        let id: ObjectId = handle.into();
        match self.inner.objects.get_mut(&id) {
            Some(Object::Stream(stream)) => Some(stream.content.as_mut_slice()),
            _ => None,
        }
    }
}

fn is_structural(stream: &lopdf::Stream) -> bool {
    match stream.dict.get(b"Type") {
        Ok(Object::Name(name)) => STRUCTURAL_STREAM_TYPES
            .iter()
            .any(|t| t.as_bytes() == name.as_slice()),
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};

    /// Build a one-page PDF carrying the given extra streams.
    ///
    /// Each entry is `(type tag, content)`; streams are added after the page
    /// tree so their object ids follow the order given.
    pub fn create_test_pdf(streams: &[(Option<&str>, Vec<u8>)]) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf 50 700 Td (Hello) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        for (type_tag, content) in streams {
            let mut dict = Dictionary::new();
            if let Some(tag) = type_tag {
                dict.set("Type", Object::Name(tag.as_bytes().to_vec()));
            }
            doc.add_object(Stream::new(dict, content.clone()));
        }
        doc
    }

    /// A PDF whose only objects are plain dictionaries.
    pub fn create_streamless_pdf() -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }
}
