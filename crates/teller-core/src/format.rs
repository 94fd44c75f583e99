//! Splits assistant replies into plain and emphasized segments.
//!
//! Emphasis is written `**like this**` and never spans a line break. Anything
//! that does not form a closed pair on one line is kept as literal text, so a
//! malformed reply still renders.

use serde::{Deserialize, Serialize};

const MARKER: &str = "**";

/// A run of reply text that is either plain or emphasized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedSegment {
    pub text: String,
    pub emphasized: bool,
}

impl FormattedSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Parse `text` into segments, stripping the emphasis markers.
///
/// Empty segments are dropped and neighbouring segments with the same
/// emphasis are merged, so the result alternates plain/emphasized.
pub fn segments(text: &str) -> Vec<FormattedSegment> {
    let mut out: Vec<FormattedSegment> = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if rest.starts_with(MARKER) {
            if let Some(inner_len) = closing_marker(&rest[MARKER.len()..]) {
                if !plain.is_empty() {
                    push_segment(&mut out, FormattedSegment::plain(std::mem::take(&mut plain)));
                }
                let inner = &rest[MARKER.len()..MARKER.len() + inner_len];
                push_segment(&mut out, FormattedSegment::emphasized(inner));
                i += inner_len + 2 * MARKER.len();
                continue;
            }
        }

        // Not the start of a closed pair: keep one character and rescan from the next
        let Some(c) = rest.chars().next() else { break };
        plain.push(c);
        i += c.len_utf8();
    }

    if !plain.is_empty() {
        push_segment(&mut out, FormattedSegment::plain(plain));
    }

    out
}

/// The reply text with emphasis markers removed.
pub fn strip_markers(text: &str) -> String {
    segments(text).into_iter().map(|s| s.text).collect()
}

/// Concatenated text of a segment list.
pub fn joined(segments: &[FormattedSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Byte length of the emphasized span before the closing marker, if the
/// closing marker appears before the end of the line.
fn closing_marker(after_open: &str) -> Option<usize> {
    let line = match after_open.find('\n') {
        Some(end) => &after_open[..end],
        None => after_open,
    };
    line.find(MARKER)
}

fn push_segment(out: &mut Vec<FormattedSegment>, segment: FormattedSegment) {
    if segment.text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.emphasized == segment.emphasized => last.text.push_str(&segment.text),
        _ => out.push(segment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_emphasized() {
        let segs = segments("Your balance is **1,000,000 VND**");
        assert_eq!(
            segs,
            vec![
                FormattedSegment::plain("Your balance is "),
                FormattedSegment::emphasized("1,000,000 VND"),
            ]
        );
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(segments("hello"), vec![FormattedSegment::plain("hello")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        assert_eq!(
            segments("rate is **5% per year"),
            vec![FormattedSegment::plain("rate is **5% per year")]
        );
    }

    #[test]
    fn test_marker_does_not_cross_lines() {
        assert_eq!(
            segments("**open\nclose**"),
            vec![FormattedSegment::plain("**open\nclose**")]
        );
    }

    #[test]
    fn test_later_pair_after_broken_one() {
        assert_eq!(
            segments("a**b\n**c**"),
            vec![
                FormattedSegment::plain("a**b\n"),
                FormattedSegment::emphasized("c"),
            ]
        );
    }

    #[test]
    fn test_empty_pair_is_dropped_and_neighbours_merge() {
        assert_eq!(segments("ab****cd"), vec![FormattedSegment::plain("abcd")]);
    }

    #[test]
    fn test_adjacent_emphasis_merges() {
        assert_eq!(
            segments("**one****two** end"),
            vec![
                FormattedSegment::emphasized("onetwo"),
                FormattedSegment::plain(" end"),
            ]
        );
    }

    #[test]
    fn test_triple_star_keeps_inner_star() {
        assert_eq!(segments("***a**"), vec![FormattedSegment::emphasized("*a")]);
    }

    #[test]
    fn test_multibyte_text() {
        let segs = segments("Số dư: **1.000.000 ₫** nhé");
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1], FormattedSegment::emphasized("1.000.000 ₫"));
        assert_eq!(strip_markers("Số dư: **1.000.000 ₫** nhé"), "Số dư: 1.000.000 ₫ nhé");
    }
}
