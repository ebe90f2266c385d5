//! DOCX package container
//!
//! A DOCX file is a ZIP archive of XML parts. [`OoxmlArchive`] keeps the
//! parts in memory, ordered by name, so the writer can assemble a package and
//! the reader (or the `inspect` command) can open one back up.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};
use crate::writer::DOCUMENT_PATH;

/// Part that consumers expect as the first ZIP entry
const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// An unpacked OOXML package
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OoxmlArchive {
    parts: BTreeMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Unpack a package from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut parts = BTreeMap::new();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            parts.insert(entry.name().to_string(), contents);
        }

        Ok(Self { parts })
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(Vec::as_slice)
    }

    /// A part decoded as UTF-8 (lossily)
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// The main document part
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_PATH)
            .ok_or_else(|| OoxmlError::MissingFile(DOCUMENT_PATH.to_string()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// Part names in sorted order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Insert or replace a part
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.parts.insert(path.into(), contents);
    }

    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.set(path, contents.into().into_bytes());
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_to(File::create(path)?)
    }

    /// Write the package as a ZIP stream
    ///
    /// `[Content_Types].xml` goes first, then every other part in name order,
    /// so equal packages produce identical bytes.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let content_types = self.parts.get_key_value(CONTENT_TYPES_PATH);
        let rest = self
            .parts
            .iter()
            .filter(|(path, _)| path.as_str() != CONTENT_TYPES_PATH);
        for (path, contents) in content_types.into_iter().chain(rest) {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_part_access() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("word/styles.xml", "<w:styles/>");

        assert!(archive.contains("word/styles.xml"));
        assert_eq!(
            archive.get_string("word/styles.xml").as_deref(),
            Some("<w:styles/>")
        );
        assert!(archive.get("word/numbering.xml").is_none());
    }

    #[test]
    fn test_missing_document_part() {
        let archive = OoxmlArchive::new();
        assert!(matches!(
            archive.document_xml(),
            Err(OoxmlError::MissingFile(ref p)) if p == DOCUMENT_PATH
        ));
    }

    #[test]
    fn test_content_types_written_first() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("_rels/.rels", "<Relationships/>");
        archive.set_string(DOCUMENT_PATH, "<w:document/>");
        archive.set_string(CONTENT_TYPES_PATH, "<Types/>");

        let mut buffer = Cursor::new(Vec::new());
        archive.write_to(&mut buffer).unwrap();

        buffer.set_position(0);
        let mut zip = ZipArchive::new(buffer).unwrap();
        assert_eq!(zip.by_index(0).unwrap().name(), CONTENT_TYPES_PATH);
        assert_eq!(zip.len(), 3);
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut archive = OoxmlArchive::new();
        archive.set_string(DOCUMENT_PATH, "<w:document/>");
        archive.set_string("docProps/core.xml", "<cp:coreProperties/>");

        let mut first = Cursor::new(Vec::new());
        let mut second = Cursor::new(Vec::new());
        archive.write_to(&mut first).unwrap();
        archive.write_to(&mut second).unwrap();
        assert_eq!(first.into_inner(), second.into_inner());
    }

    #[test]
    fn test_write_to_file_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");

        let mut archive = OoxmlArchive::new();
        archive.set(DOCUMENT_PATH, b"<w:document/>".to_vec());
        archive.write_to_file(&path).unwrap();

        let reopened = OoxmlArchive::open(&path).unwrap();
        assert_eq!(reopened, archive);
        assert_eq!(reopened.file_list().collect::<Vec<_>>(), vec![DOCUMENT_PATH]);
    }
}
