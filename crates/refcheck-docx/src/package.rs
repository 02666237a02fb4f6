/*
 * package.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * OPC (zip) package reading and writing.
 */

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{DocxError, Result};

/// One entry of the package, held in memory.
#[derive(Debug, Clone)]
pub(crate) struct Part {
    pub name: String,
    pub data: Vec<u8>,
    pub stored: bool,
    pub is_dir: bool,
}

/// Every entry of a `.docx` package, in archive order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Package {
    parts: Vec<Part>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::read(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(Cursor::new(bytes))
    }

    fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.push(Part {
                name: entry.name().to_string(),
                stored: entry.compression() == CompressionMethod::Stored,
                is_dir: entry.is_dir(),
                data,
            });
        }
        tracing::debug!(parts = parts.len(), "Read package");
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.data.as_slice())
    }

    /// The text of an XML part.
    pub fn xml_part(&self, name: &str) -> Result<Option<String>> {
        match self.part(name) {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| DocxError::Encoding(name.to_string())),
        }
    }

    /// Write the package with `replacements` substituted for the parts they
    /// name. Every other part is copied unchanged.
    pub fn write_to(&self, path: &Path, replacements: &[(&str, &[u8])]) -> Result<()> {
        let file = File::create(path)?;
        self.write(file, replacements)
    }

    pub fn write<W: Write + Seek>(&self, sink: W, replacements: &[(&str, &[u8])]) -> Result<()> {
        let mut writer = ZipWriter::new(sink);
        for part in &self.parts {
            let method = if part.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = FileOptions::default().compression_method(method);
            if part.is_dir {
                writer.add_directory(part.name.as_str(), options)?;
                continue;
            }
            let data = replacements
                .iter()
                .find(|(name, _)| *name == part.name)
                .map(|(_, data)| *data)
                .unwrap_or(part.data.as_slice());
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(data)?;
        }
        writer.finish()?;
        Ok(())
    }
}
