/*
 * extract.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Numeric label extraction from citation and bibliography text.
 */

//! Numeric label extraction.
//!
//! [`NumberExtractor`] turns a text span such as `[2, 5-7]` into the integers
//! it cites. Extraction runs in two passes:
//!
//! 1. every `digits-digits` pattern is read as a range and expanded, unless
//!    its span exceeds the guard (default [`DEFAULT_MAX_RANGE_SPAN`]), in
//!    which case both endpoints are emitted as standalone numbers;
//! 2. the range substrings are removed and the remaining standalone digit
//!    runs on word boundaries are emitted.
//!
//! The output is pass 1 followed by pass 2, which is not always textual
//! order: in `2, 5-7` the range expands before the `2` is emitted.
//! Sequence analysis downstream depends on exactly this order.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Largest `end - start` that is still expanded as a range.
///
/// Wider spans are phone numbers, year ranges or typos like `1-1000000`.
pub const DEFAULT_MAX_RANGE_SPAN: u64 = 999;

static RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)-([0-9]+)").unwrap());
static STANDALONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]+\b").unwrap());
static DIGITS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// What a numeric segment of text denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A standalone number.
    Single(u64),
    /// `start-end`, expanded to every integer in `start..=end`.
    Range { start: u64, end: u64 },
    /// `start-end` wider than the guard; the endpoints stand alone.
    GuardedPair { start: u64, end: u64 },
}

/// A numeric segment and its byte span within the extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSegment {
    pub kind: SegmentKind,
    pub span: Range<usize>,
}

impl NumberSegment {
    /// The integers this segment contributes, in emission order.
    pub fn numbers(&self) -> Vec<u64> {
        match self.kind {
            SegmentKind::Single(n) => vec![n],
            SegmentKind::Range { start, end } => (start..=end).collect(),
            SegmentKind::GuardedPair { start, end } => vec![start, end],
        }
    }
}

/// One extracted integer with its originating byte span.
///
/// Integers expanded from the same range share that range's span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberToken {
    pub value: u64,
    pub start: usize,
    pub end: usize,
    /// Whether the value came from expanding a range.
    pub from_range: bool,
}

/// Parses text spans into ordered lists of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberExtractor {
    max_range_span: u64,
}

impl NumberExtractor {
    pub fn new() -> Self {
        Self {
            max_range_span: DEFAULT_MAX_RANGE_SPAN,
        }
    }

    pub fn with_max_range_span(max_range_span: u64) -> Self {
        Self { max_range_span }
    }

    pub fn max_range_span(&self) -> u64 {
        self.max_range_span
    }

    /// Extract the integers in `text`: range expansions first, then
    /// standalone numbers.
    pub fn extract(&self, text: &str) -> Vec<u64> {
        self.segments(text)
            .iter()
            .flat_map(NumberSegment::numbers)
            .collect()
    }

    /// Extract integers together with their spans.
    pub fn tokens(&self, text: &str) -> Vec<NumberToken> {
        self.segments(text)
            .iter()
            .flat_map(|segment| {
                let from_range = matches!(segment.kind, SegmentKind::Range { .. });
                segment.numbers().into_iter().map(move |value| NumberToken {
                    value,
                    start: segment.span.start,
                    end: segment.span.end,
                    from_range,
                })
            })
            .collect()
    }

    /// Extract the numeric segments of `text`, in emission order.
    ///
    /// Descending ranges (`5-3`) and digit runs too long for `u64` yield no
    /// segment, but descending ranges are still removed before the
    /// standalone pass.
    pub fn segments(&self, text: &str) -> Vec<NumberSegment> {
        let mut segments = Vec::new();

        for caps in RANGE_PATTERN.captures_iter(text) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
            let (Ok(start), Ok(end)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>()) else {
                continue;
            };
            let kind = if end.saturating_sub(start) > self.max_range_span {
                SegmentKind::GuardedPair { start, end }
            } else if end >= start {
                SegmentKind::Range { start, end }
            } else {
                continue;
            };
            segments.push(NumberSegment { kind, span: whole });
        }

        let remainder = Remainder::without_ranges(text);
        for m in STANDALONE_PATTERN.find_iter(&remainder.text) {
            let Ok(value) = m.as_str().parse::<u64>() else {
                continue;
            };
            let start = remainder.original_offset(m.start());
            segments.push(NumberSegment {
                kind: SegmentKind::Single(value),
                span: start..start + m.len(),
            });
        }

        segments
    }
}

impl Default for NumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract with the default guard.
pub fn extract_numbers(text: &str) -> Vec<u64> {
    NumberExtractor::new().extract(text)
}

/// The first digit run in `text` that fits in a `u64`, with its byte span.
///
/// Unlike extraction, no word boundary is required: `"12."` and `"ref12"`
/// both yield 12.
pub fn first_number(text: &str) -> Option<(Range<usize>, u64)> {
    DIGITS_PATTERN
        .find_iter(text)
        .find_map(|m| m.as_str().parse::<u64>().ok().map(|n| (m.range(), n)))
}

/// Text with every range removed, remembering where each kept piece came from.
struct Remainder {
    text: String,
    /// `(offset in remainder, offset in original)` for each kept piece.
    pieces: Vec<(usize, usize)>,
}

impl Remainder {
    fn without_ranges(text: &str) -> Self {
        let mut kept = String::with_capacity(text.len());
        let mut pieces = Vec::new();
        let mut last = 0;
        for m in RANGE_PATTERN.find_iter(text) {
            pieces.push((kept.len(), last));
            kept.push_str(&text[last..m.start()]);
            last = m.end();
        }
        pieces.push((kept.len(), last));
        kept.push_str(&text[last..]);
        Self { text: kept, pieces }
    }

    /// Map an offset in the remainder back to the original text.
    ///
    /// Digit runs never straddle a removed range (a range match is greedy on
    /// both sides), so mapping the start of a match is enough.
    fn original_offset(&self, offset: usize) -> usize {
        let index = self.pieces.partition_point(|&(kept, _)| kept <= offset) - 1;
        let (kept, original) = self.pieces[index];
        original + (offset - kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_range() {
        assert_eq!(extract_numbers("See figures 1-5"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_guard_triggers_on_wide_range() {
        assert_eq!(extract_numbers("Typo 1-1000000"), vec![1, 1_000_000]);
        assert_eq!(extract_numbers("Phone 555-1234"), vec![555, 1234]);
    }

    #[test]
    fn test_guard_boundary() {
        assert_eq!(extract_numbers("1-1000").len(), 1000);
        assert_eq!(extract_numbers("1-1001"), vec![1, 1001]);
        assert_eq!(extract_numbers("Year 2024-2025"), vec![2024, 2025]);
    }

    #[test]
    fn test_custom_guard() {
        let extractor = NumberExtractor::with_max_range_span(2);
        assert_eq!(extractor.extract("[3-5]"), vec![3, 4, 5]);
        assert_eq!(extractor.extract("[3-6]"), vec![3, 6]);
    }

    #[test]
    fn test_empty_and_non_numeric() {
        assert!(extract_numbers("").is_empty());
        assert!(extract_numbers("[a, b]").is_empty());
        // No word boundary between letters and digits.
        assert!(extract_numbers("ref12").is_empty());
    }

    #[test]
    fn test_ranges_emitted_before_standalone_numbers() {
        assert_eq!(extract_numbers("[2, 5-7]"), vec![5, 6, 7, 2]);
        assert_eq!(extract_numbers("[9, 1-2, 4]"), vec![1, 2, 9, 4]);
    }

    #[test]
    fn test_descending_range_is_dropped() {
        assert!(extract_numbers("[5-3]").is_empty());
        assert_eq!(extract_numbers("[5-3, 8]"), vec![8]);
    }

    #[test]
    fn test_chained_hyphens() {
        // "1-2" is a range; the trailing "-3" leaves a standalone 3.
        assert_eq!(extract_numbers("1-2-3"), vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(extract_numbers("[1-2, 2]"), vec![1, 2, 2]);
    }

    #[test]
    fn test_oversized_digit_runs_are_ignored() {
        assert_eq!(extract_numbers("[99999999999999999999999, 4]"), vec![4]);
    }

    #[test]
    fn test_token_spans_point_into_original_text() {
        let text = "[2, 5-7, 10]";
        let tokens = NumberExtractor::new().tokens(text);
        let rendered: Vec<_> = tokens
            .iter()
            .map(|t| (t.value, &text[t.start..t.end], t.from_range))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (5, "5-7", true),
                (6, "5-7", true),
                (7, "5-7", true),
                (2, "2", false),
                (10, "10", false),
            ]
        );
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("12. Smith 2019"), Some((0..2, 12)));
        assert_eq!(first_number("ref7"), Some((3..4, 7)));
        assert_eq!(first_number("none"), None);
    }

    #[test]
    fn test_segments() {
        let segments = NumberExtractor::new().segments("(12; 3-1; 40-5000)");
        assert_eq!(
            segments,
            vec![
                NumberSegment {
                    kind: SegmentKind::GuardedPair {
                        start: 40,
                        end: 5000
                    },
                    span: 10..17,
                },
                NumberSegment {
                    kind: SegmentKind::Single(12),
                    span: 1..3,
                },
            ]
        );
    }
}
