/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering of renumbered labels.
 */

use super::RenumberMap;
use crate::extract::{NumberExtractor, SegmentKind, first_number};

/// Render the mapped form of one numeric segment.
///
/// A range keeps compact `a-b` notation when its mapped values, sorted, are
/// consecutive; otherwise it becomes a comma list in the range's own order.
/// Guard-triggered pairs are mapped endpoint by endpoint.
pub fn render_segment(kind: SegmentKind, map: &RenumberMap) -> String {
    match kind {
        SegmentKind::Single(n) => map.get(n).to_string(),
        SegmentKind::GuardedPair { start, end } => {
            format!("{}-{}", map.get(start), map.get(end))
        }
        SegmentKind::Range { start, end } => {
            let mapped: Vec<u64> = (start..=end).map(|n| map.get(n)).collect();
            let mut sorted = mapped.clone();
            sorted.sort_unstable();
            let contiguous = sorted.windows(2).all(|pair| pair[1] == pair[0] + 1);
            match (sorted.first(), sorted.last()) {
                (Some(min), Some(max)) if contiguous && min == max => min.to_string(),
                (Some(min), Some(max)) if contiguous => format!("{}-{}", min, max),
                _ => mapped
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            }
        }
    }
}

/// Substitute every numeric segment of a citation, leaving all other
/// characters untouched.
pub fn rewrite_citation_text(text: &str, map: &RenumberMap, extractor: &NumberExtractor) -> String {
    let mut segments = extractor.segments(text);
    segments.sort_by_key(|segment| segment.span.start);

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for segment in segments {
        out.push_str(&text[last..segment.span.start]);
        out.push_str(&render_segment(segment.kind, map));
        last = segment.span.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Replace the first integer in `text` with its mapped value.
///
/// Returns `None` when `text` holds no integer.
pub fn rewrite_first_number(text: &str, map: &RenumberMap) -> Option<String> {
    let (span, old) = first_number(text)?;
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push_str(&map.get(old).to_string());
    out.push_str(&text[span.end..]);
    Some(out)
}

/// Render integers as sorted, deduplicated runs: `1,3-5,7`.
pub fn compact_numbers(numbers: impl IntoIterator<Item = u64>) -> String {
    let mut sorted: Vec<u64> = numbers.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut parts = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(mut start) = iter.next() else {
        return String::new();
    };
    let mut prev = start;
    for n in iter {
        if n == prev + 1 {
            prev = n;
            continue;
        }
        parts.push(render_run(start, prev));
        start = n;
        prev = n;
    }
    parts.push(render_run(start, prev));
    parts.join(",")
}

fn render_run(start: u64, end: u64) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}
