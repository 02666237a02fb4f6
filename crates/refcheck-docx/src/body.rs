/*
 * body.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Paragraph/run model of word/document.xml and text splicing.
 */

//! Paragraph/run model of `word/document.xml`.
//!
//! Parsing records, for every `w:t` element, the byte span of the whole
//! element in the part. Rewriting replaces exactly those spans, so all other
//! markup is written back byte for byte.
//!
//! Only `w:t` contributes text. Tracked-change property snapshots
//! (`w:pPrChange`, `w:rPrChange`) and `mc:Fallback` copies of alternate
//! content are skipped.

use std::ops::Range;

use quick_xml::Reader;
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use refcheck_core::{Run, RunLayout};

use crate::error::{DocxError, Result};
use crate::styles::{StyleRegistry, attribute};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

/// A `w:t` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextNode {
    /// Byte span of the element, tags included.
    pub span: Range<usize>,
    pub text: String,
}

/// The parsed body: a layout plus, for every run of every paragraph, the
/// text elements the run's text came from.
#[derive(Debug, Clone, Default)]
pub(crate) struct Body {
    pub layout: RunLayout,
    pub nodes: Vec<Vec<Vec<TextNode>>>,
}

#[derive(Default)]
struct ParagraphState {
    style: Option<String>,
    runs: Vec<RunState>,
}

#[derive(Default)]
struct RunState {
    style: Option<String>,
    nodes: Vec<TextNode>,
}

/// Element names whose subtree is skipped entirely.
const SKIPPED: &[&[u8]] = &[b"w:pPrChange", b"w:rPrChange", b"mc:Fallback"];

pub(crate) fn parse(xml: &str, styles: &StyleRegistry) -> Result<Body> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut paragraphs: Vec<ParagraphState> = Vec::new();
    let mut open_paragraphs: Vec<usize> = Vec::new();
    let mut open_runs: Vec<(usize, usize)> = Vec::new();
    let mut in_paragraph_props = false;
    let mut in_run_props = false;
    let mut open_text: Option<usize> = None;

    loop {
        let event = reader.read_event().map_err(|e| syntax_error(&reader, e))?;
        let position = reader.buffer_position() as usize;
        match event {
            Event::Start(e) if SKIPPED.contains(&e.name().as_ref()) => {
                reader
                    .read_to_end(e.name())
                    .map_err(|err| syntax_error(&reader, err))?;
            }
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    open_paragraphs.push(paragraphs.len());
                    paragraphs.push(ParagraphState::default());
                }
                b"w:pPr" => in_paragraph_props = true,
                b"w:rPr" => in_run_props = true,
                b"w:r" => {
                    if let Some(run) = open_run(&mut paragraphs, &open_paragraphs) {
                        open_runs.push(run);
                    }
                }
                b"w:t" if !open_runs.is_empty() => {
                    open_text = Some(tag_start(xml, position));
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:pStyle" if in_paragraph_props => {
                    if let Some(&index) = open_paragraphs.last() {
                        paragraphs[index].style = style_name(&e, styles);
                    }
                }
                b"w:rStyle" if in_run_props && !in_paragraph_props => {
                    if let Some(&(p, r)) = open_runs.last() {
                        paragraphs[p].runs[r].style = style_name(&e, styles);
                    }
                }
                b"w:r" => {
                    open_run(&mut paragraphs, &open_paragraphs);
                }
                b"w:p" => paragraphs.push(ParagraphState::default()),
                b"w:t" => {
                    if let Some(&(p, r)) = open_runs.last() {
                        paragraphs[p].runs[r].nodes.push(TextNode {
                            span: tag_start(xml, position)..position,
                            text: String::new(),
                        });
                    }
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    open_paragraphs.pop();
                }
                b"w:pPr" => in_paragraph_props = false,
                b"w:rPr" => in_run_props = false,
                b"w:r" => {
                    open_runs.pop();
                }
                b"w:t" => {
                    if let (Some(start), Some(&(p, r))) = (open_text.take(), open_runs.last()) {
                        let content_start = content_start(xml, start);
                        let content_end = tag_start(xml, position);
                        let raw = &xml[content_start..content_end];
                        let text = unescape(raw)
                            .map_err(|err| DocxError::xml(DOCUMENT_PART, err))?
                            .into_owned();
                        paragraphs[p].runs[r].nodes.push(TextNode {
                            span: start..position,
                            text,
                        });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let mut body = Body::default();
    for paragraph in paragraphs {
        let mut runs = Vec::with_capacity(paragraph.runs.len());
        let mut nodes = Vec::with_capacity(paragraph.runs.len());
        for run in paragraph.runs {
            let text: String = run.nodes.iter().map(|node| node.text.as_str()).collect();
            runs.push(Run::new(text, run.style));
            nodes.push(run.nodes);
        }
        body.layout.push_paragraph(paragraph.style, runs);
        body.nodes.push(nodes);
    }
    tracing::debug!(
        paragraphs = body.layout.paragraph_count(),
        "Parsed document body"
    );
    Ok(body)
}

/// Start a run in the innermost open paragraph.
fn open_run(
    paragraphs: &mut [ParagraphState],
    open_paragraphs: &[usize],
) -> Option<(usize, usize)> {
    let &paragraph = open_paragraphs.last()?;
    let runs = &mut paragraphs[paragraph].runs;
    runs.push(RunState::default());
    Some((paragraph, runs.len() - 1))
}

fn style_name(e: &BytesStart<'_>, styles: &StyleRegistry) -> Option<String> {
    let id = attribute(e, b"w:val")?;
    Some(styles.name_for_id(&id).map_or(id.clone(), str::to_string))
}

/// Offset of the `<` opening the tag that ends just before `end`.
fn tag_start(xml: &str, end: usize) -> usize {
    xml[..end].rfind('<').unwrap_or(end)
}

/// Offset just past the `>` of the start tag beginning at `start`.
fn content_start(xml: &str, start: usize) -> usize {
    xml[start..].find('>').map_or(start, |i| start + i + 1)
}

fn syntax_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> DocxError {
    DocxError::xml(
        DOCUMENT_PART,
        format!("{} at byte {}", err, reader.buffer_position()),
    )
}

/// Render the part with every changed run written back into its `w:t`
/// elements.
///
/// A changed run's text goes into its first `w:t`; its other `w:t` elements
/// are emptied.
pub(crate) fn render(xml: &str, body: &Body, layout: &RunLayout) -> Result<String> {
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for (p, runs) in body.nodes.iter().enumerate() {
        for (r, nodes) in runs.iter().enumerate() {
            let Some(run) = layout.runs(p).get(r) else {
                continue;
            };
            let original: String = nodes.iter().map(|node| node.text.as_str()).collect();
            if run.text == original {
                continue;
            }
            let Some((first, rest)) = nodes.split_first() else {
                return Err(DocxError::xml(
                    DOCUMENT_PART,
                    format!("run {} of paragraph {} has no text element", r, p),
                ));
            };
            edits.push((first.span.clone(), text_element(&run.text)));
            for node in rest {
                edits.push((node.span.clone(), text_element("")));
            }
        }
    }

    edits.sort_by_key(|(span, _)| span.start);
    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for (span, replacement) in &edits {
        out.push_str(&xml[last..span.start]);
        out.push_str(replacement);
        last = span.end;
    }
    out.push_str(&xml[last..]);
    tracing::debug!(elements = edits.len(), "Rendered document body");
    Ok(out)
}

fn text_element(text: &str) -> String {
    if text.is_empty() {
        return "<w:t/>".to_string();
    }
    let escaped = partial_escape(text);
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        format!("<w:t xml:space=\"preserve\">{}</w:t>", escaped)
    } else {
        format!("<w:t>{}</w:t>", escaped)
    }
}
