/*
 * numbers.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Numbers command implementation
 */

//! `refcheck numbers` shows how a citation text is read: each numeric
//! segment, what it denotes, and the resulting integer list.

use anyhow::Result;
use serde_json::{Value, json};

use refcheck_core::{NumberExtractor, NumberSegment, SegmentKind, compact_numbers};

use super::OutputFormat;

/// Execute the numbers command
pub fn execute(text: &str, max_range_span: Option<u64>, format: OutputFormat) -> Result<()> {
    let extractor = max_range_span
        .map(NumberExtractor::with_max_range_span)
        .unwrap_or_default();
    match format {
        OutputFormat::Text => println!("{}", describe(text, &extractor)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&to_json(text, &extractor))?
        ),
    }
    Ok(())
}

fn kind_label(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Single(_) => "single",
        SegmentKind::Range { .. } => "range",
        SegmentKind::GuardedPair { .. } => "guarded pair",
    }
}

fn join(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(text: &str, extractor: &NumberExtractor) -> String {
    let segments = extractor.segments(text);
    let mut lines: Vec<String> = segments
        .iter()
        .map(|segment| {
            format!(
                "{:<12} {:<12} {}",
                &text[segment.span.clone()],
                kind_label(segment.kind),
                join(&segment.numbers())
            )
        })
        .collect();
    let numbers: Vec<u64> = segments.iter().flat_map(NumberSegment::numbers).collect();
    lines.push(format!("numbers: {}", join(&numbers)));
    lines.push(format!("compact: {}", compact_numbers(numbers)));
    lines.join("\n")
}

fn to_json(text: &str, extractor: &NumberExtractor) -> Value {
    let segments = extractor.segments(text);
    let numbers: Vec<u64> = segments.iter().flat_map(NumberSegment::numbers).collect();
    json!({
        "text": text,
        "max-range-span": extractor.max_range_span(),
        "segments": segments
            .iter()
            .map(|segment| json!({
                "text": &text[segment.span.clone()],
                "kind": kind_label(segment.kind),
                "numbers": segment.numbers(),
            }))
            .collect::<Vec<_>>(),
        "numbers": numbers,
    })
}
