/*
 * cli.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for the refcheck binary.
 */

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::FileOptions;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:styleId="REFN"><w:name w:val="REF-N"/></w:style>
<w:style w:type="character" w:styleId="citebib"><w:name w:val="cite_bib"/></w:style>
<w:style w:type="character" w:styleId="bibnumber"><w:name w:val="bib_number"/></w:style>
</w:styles>"#;

fn cite(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">Claim </w:t></w:r><w:r><w:rPr><w:rStyle w:val="citebib"/></w:rPr><w:t>{}</w:t></w:r></w:p>"#,
        text
    )
}

fn entry(label: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="REFN"/></w:pPr><w:r><w:rPr><w:rStyle w:val="bibnumber"/></w:rPr><w:t>{}</w:t></w:r><w:r><w:t xml:space="preserve"> Some source.</w:t></w:r></w:p>"#,
        label
    )
}

/// A document citing `citations` with one bibliography entry per label.
fn write_docx(dir: &Path, name: &str, citations: &[&str], labels: &[&str]) -> PathBuf {
    let body: String = citations
        .iter()
        .map(|c| cite(c))
        .chain(labels.iter().map(|l| entry(l)))
        .collect();
    let document = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        for (part, data) in [("word/styles.xml", STYLES), ("word/document.xml", document.as_str())] {
            zip.start_file(part, FileOptions::default()).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    let path = dir.join(name);
    fs::write(&path, cursor.into_inner()).unwrap();
    path
}

fn refcheck(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_refcheck"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run refcheck")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_validate_prints_summary_and_does_not_write() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "paper.docx", &["[2]", "[1]"], &["1.", "2."]);
    let before = fs::read(&input).unwrap();

    let output = refcheck(&["validate", path_arg(&input)]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("References defined: 2"));
    assert!(text.contains("Citations are NOT in sequence. (2 is cited before 1)"));

    assert_eq!(fs::read(&input).unwrap(), before);
    assert!(!temp.path().join("renumbered_paper.docx").exists());
}

#[test]
fn test_renumber_writes_default_target() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "paper.docx", &["[2]", "[1]"], &["1.", "2."]);

    let output = refcheck(&["validate", path_arg(&input), "--renumber"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Renumbered 2 references"));
    assert!(text.contains("  2 -> 1"));

    let target = temp.path().join("renumbered_paper.docx");
    assert!(target.exists());
    let check = refcheck(&["validate", path_arg(&target), "--strict"]);
    assert!(check.status.success());
    assert!(stdout(&check).contains("Citations are in proper sequence."));
}

#[test]
fn test_renumber_in_place_with_json() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "paper.docx", &["[2]", "[1]"], &["1.", "2."]);

    let output = refcheck(&[
        "validate",
        path_arg(&input),
        "--renumber",
        "--in-place",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["confirmed"], true);
    assert_eq!(value["report"]["citation_sequence"], serde_json::json!([1, 2]));
    assert_eq!(value["renumber"]["map"]["2"], 1);

    let check = refcheck(&["validate", path_arg(&input), "--format", "json"]);
    let report: serde_json::Value = serde_json::from_slice(&check.stdout).unwrap();
    assert_eq!(report["sequence_ordered"], true);
}

#[test]
fn test_strict_fails_on_unused_reference() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "paper.docx", &["[1]"], &["1.", "2."]);

    let output = refcheck(&["validate", path_arg(&input), "--strict"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("Unused references: 2"));
}

#[test]
fn test_missing_citation_style_is_an_error() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "paper.docx", &["[1]"], &["1."]);

    let output = refcheck(&[
        "validate",
        path_arg(&input),
        "--citation-style",
        "NoSuchStyle",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("'NoSuchStyle' style not found"));
}

#[test]
fn test_numbers_command() {
    let output = refcheck(&["numbers", "[2, 5-7]"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("numbers: 5, 6, 7, 2"));
}
