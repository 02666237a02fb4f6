/*
 * styles.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Style registry parsed from word/styles.xml.
 */

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use refcheck_core::StyleKind;

use crate::error::{DocxError, Result};

pub(crate) const STYLES_PART: &str = "word/styles.xml";

/// One paragraph or character style definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDef {
    /// The `w:styleId` that document markup refers to.
    pub id: String,
    /// The display name (`w:name`), falling back to the id.
    pub name: String,
    pub kind: StyleKind,
}

/// The paragraph and character styles of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRegistry {
    styles: Vec<StyleDef>,
}

impl StyleRegistry {
    /// Parse `word/styles.xml`. Table and numbering styles are skipped.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut styles = Vec::new();
        let mut current: Option<PendingStyle> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                DocxError::xml(
                    STYLES_PART,
                    format!("{} at byte {}", e, reader.buffer_position()),
                )
            })?;
            match event {
                Event::Start(e) if e.name().as_ref() == b"w:style" => {
                    current = Some(PendingStyle::from_element(&e));
                }
                Event::Empty(e) if e.name().as_ref() == b"w:style" => {
                    styles.extend(PendingStyle::from_element(&e).finish());
                }
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:name" => {
                    if let Some(pending) = current.as_mut() {
                        pending.name = attribute(&e, b"w:val");
                    }
                }
                Event::End(e) if e.name().as_ref() == b"w:style" => {
                    if let Some(pending) = current.take() {
                        styles.extend(pending.finish());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        tracing::debug!(styles = styles.len(), "Parsed style registry");
        Ok(Self { styles })
    }

    /// Look a style up by display name, then by id, then by display name
    /// ignoring case.
    pub fn resolve(&self, name: &str) -> Option<&StyleDef> {
        self.styles
            .iter()
            .find(|style| style.name == name)
            .or_else(|| self.styles.iter().find(|style| style.id == name))
            .or_else(|| {
                self.styles
                    .iter()
                    .find(|style| style.name.eq_ignore_ascii_case(name))
            })
    }

    /// Display name for a style id, if the id is defined.
    pub fn name_for_id(&self, id: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|style| style.id == id)
            .map(|style| style.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleDef> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

struct PendingStyle {
    id: Option<String>,
    kind: Option<StyleKind>,
    name: Option<String>,
}

impl PendingStyle {
    fn from_element(e: &BytesStart<'_>) -> Self {
        // An absent w:type means a paragraph style.
        let kind = match attribute(e, b"w:type").as_deref() {
            None | Some("paragraph") => Some(StyleKind::Paragraph),
            Some("character") => Some(StyleKind::Character),
            Some(_) => None,
        };
        Self {
            id: attribute(e, b"w:styleId"),
            kind,
            name: None,
        }
    }

    fn finish(self) -> Option<StyleDef> {
        let id = self.id?;
        let kind = self.kind?;
        Some(StyleDef {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            kind,
        })
    }
}

/// The unescaped value of attribute `key`.
pub(crate) fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="REFN"><w:name w:val="REF-N"/><w:basedOn w:val="Normal"/></w:style>
  <w:style w:type="character" w:styleId="citebib"><w:name w:val="cite_bib"/></w:style>
  <w:style w:type="character" w:styleId="bibnumber"><w:name w:val="bib_number"/></w:style>
  <w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="character" w:styleId="Unnamed"/>
</w:styles>"#;

    #[test]
    fn test_parse_skips_table_styles() {
        let registry = StyleRegistry::parse(STYLES).unwrap();
        assert_eq!(registry.len(), 6);
        assert!(registry.resolve("Table Grid").is_none());
    }

    #[test]
    fn test_resolve_by_name_id_and_case() {
        let registry = StyleRegistry::parse(STYLES).unwrap();

        let by_name = registry.resolve("REF-N").unwrap();
        assert_eq!(by_name.id, "REFN");
        assert_eq!(by_name.kind, StyleKind::Paragraph);

        let by_id = registry.resolve("citebib").unwrap();
        assert_eq!(by_id.name, "cite_bib");
        assert_eq!(by_id.kind, StyleKind::Character);

        assert_eq!(registry.resolve("Heading 1").unwrap().id, "Heading1");
        assert_eq!(registry.resolve("Unnamed").unwrap().name, "Unnamed");
        assert!(registry.resolve("missing").is_none());
    }

    #[test]
    fn test_name_for_id() {
        let registry = StyleRegistry::parse(STYLES).unwrap();
        assert_eq!(registry.name_for_id("bibnumber"), Some("bib_number"));
        assert_eq!(registry.name_for_id("nope"), None);
    }

    #[test]
    fn test_malformed_xml() {
        let err = StyleRegistry::parse("<w:styles><w:style></w:styles>").unwrap_err();
        assert!(matches!(err, DocxError::Xml { ref part, .. } if part == STYLES_PART));
    }
}
