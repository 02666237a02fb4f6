/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * StyledDocument implementation over a .docx package.
 */

use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use refcheck_core::{
    DocumentError, FoundRange, Paragraph, RangeCursor, RunLayout, Scope, StyleHandle,
    StyledDocument,
};

use crate::body::{self, Body, DOCUMENT_PART};
use crate::error::{DocxError, Result};
use crate::package::Package;
use crate::styles::{STYLES_PART, StyleRegistry};

/// A WordprocessingML document opened for checking and renumbering.
///
/// The whole package is held in memory. Saving rewrites only the `w:t`
/// elements of runs whose text changed; every other part and every other
/// byte of `word/document.xml` is written back unchanged.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    source: Option<PathBuf>,
    package: Package,
    styles: StyleRegistry,
    document_xml: String,
    body: Body,
    layout: RunLayout,
}

impl DocxDocument {
    /// Open a `.docx` file. Saving with no path overwrites it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Opening document");
        let package = Package::open(path)?;
        Self::from_package(package, Some(path.to_path_buf()))
    }

    /// Load a package from memory. Such a document has no source, so saving
    /// requires an explicit path.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?, None)
    }

    fn from_package(package: Package, source: Option<PathBuf>) -> Result<Self> {
        let styles = match package.xml_part(STYLES_PART)? {
            Some(xml) => StyleRegistry::parse(&xml)?,
            None => {
                tracing::warn!("Package has no style definitions");
                StyleRegistry::default()
            }
        };
        let document_xml = package
            .xml_part(DOCUMENT_PART)?
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
        let body = body::parse(&document_xml, &styles)?;
        let layout = body.layout.clone();
        Ok(Self {
            source,
            package,
            styles,
            document_xml,
            body,
            layout,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn paragraph_count(&self) -> usize {
        self.layout.paragraph_count()
    }

    pub fn paragraph_text(&self, index: usize) -> Option<String> {
        self.layout.paragraph_text(index)
    }

    /// Texts of every range carrying `style`, in document order.
    ///
    /// Returns an empty list for undefined styles.
    pub fn styled_texts(&self, style: &str) -> Vec<String> {
        let Ok(handle) = self.resolve_style(style) else {
            return Vec::new();
        };
        match self.layout.find(&handle, Scope::Document) {
            Ok(found) => found.map(|range| range.text).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Whether any run differs from the text it was loaded with.
    pub fn is_modified(&self) -> bool {
        self.layout != self.body.layout
    }

    /// `word/document.xml` with the current text.
    pub fn document_xml(&self) -> Result<String> {
        body::render(&self.document_xml, &self.body, &self.layout)
    }

    /// Write the package with the current text.
    pub fn write<W: Write + Seek>(&self, sink: W) -> Result<()> {
        let xml = self.document_xml()?;
        self.package
            .write(sink, &[(DOCUMENT_PART, xml.as_bytes())])
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    fn save_to(&self, target: &Path) -> Result<()> {
        let xml = self.document_xml()?;
        self.package
            .write_to(target, &[(DOCUMENT_PART, xml.as_bytes())])?;
        tracing::info!(path = %target.display(), "Saved document");
        Ok(())
    }
}

impl StyledDocument for DocxDocument {
    fn resolve_style(&self, name: &str) -> std::result::Result<StyleHandle, DocumentError> {
        self.styles
            .resolve(name)
            .map(|def| StyleHandle::new(def.name.clone(), def.kind))
            .ok_or_else(|| DocumentError::StyleNotFound(name.to_string()))
    }

    fn paragraphs(&self) -> Vec<Paragraph> {
        self.layout.paragraphs()
    }

    fn find_by_style<'a>(
        &'a self,
        style: &StyleHandle,
        scope: Scope,
    ) -> std::result::Result<Box<dyn Iterator<Item = FoundRange> + 'a>, DocumentError> {
        Ok(Box::new(self.layout.find(style, scope)?))
    }

    fn find_by_style_mut<'a>(
        &'a mut self,
        style: &StyleHandle,
        scope: Scope,
    ) -> std::result::Result<Box<dyn RangeCursor + 'a>, DocumentError> {
        Ok(Box::new(self.layout.find_mut(style, scope)?))
    }

    fn save(&mut self, path: Option<&Path>) -> std::result::Result<(), DocumentError> {
        let target = path.map(Path::to_path_buf).or_else(|| self.source.clone());
        let Some(target) = target else {
            return Err(DocxError::NoSourcePath.into_persistence(None));
        };
        self.save_to(&target)
            .map_err(|err| err.into_persistence(Some(target)))
    }
}
