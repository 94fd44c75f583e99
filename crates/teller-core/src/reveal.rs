//! Character-by-character reveal of a formatted reply.
//!
//! [`Typewriter`] is only the cursor. Timing belongs to whoever drives it:
//! the driver waits the reveal delay, calls [`Typewriter::advance`], publishes
//! the snapshot, and only then schedules the next step. Dropping the
//! typewriter cancels the reveal.

use std::sync::Arc;

use crate::format::FormattedSegment;

/// Progress over a reply's segments.
///
/// A snapshot shares the reply's segments with the typewriter, so taking
/// one costs the same for the first character as for the last. The visible
/// prefix is built only when asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealState {
    /// Segment currently being revealed
    pub segment_index: usize,
    /// Characters of that segment revealed so far
    pub char_index: usize,
    byte_offset: usize,
    segments: Arc<[FormattedSegment]>,
}

impl RevealState {
    /// Fully revealed segments followed by the partial current one
    pub fn visible(&self) -> Vec<FormattedSegment> {
        let done = self.segment_index.min(self.segments.len());
        let mut visible = self.segments[..done].to_vec();
        if let Some(current) = self.segments.get(self.segment_index) {
            if self.byte_offset > 0 {
                visible.push(FormattedSegment {
                    text: current.text[..self.byte_offset].to_string(),
                    emphasized: current.emphasized,
                });
            }
        }
        visible
    }

    pub fn visible_text(&self) -> String {
        crate::format::joined(&self.visible())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    /// One more character is visible.
    Snapshot(RevealState),
    /// Everything is visible. Emitted once, after the last snapshot.
    Complete,
}

#[derive(Debug)]
pub struct Typewriter {
    segments: Arc<[FormattedSegment]>,
    segment_index: usize,
    byte_offset: usize,
    char_index: usize,
    visible: Vec<FormattedSegment>,
    completed: bool,
}

impl Typewriter {
    pub fn new(segments: Vec<FormattedSegment>) -> Self {
        Self {
            segments: segments.into(),
            segment_index: 0,
            byte_offset: 0,
            char_index: 0,
            visible: Vec::new(),
            completed: false,
        }
    }

    /// Reveal the next character. Returns `Complete` once after the last
    /// character and `None` from then on.
    pub fn advance(&mut self) -> Option<RevealEvent> {
        if self.completed {
            return None;
        }

        loop {
            let Some(segment) = self.segments.get(self.segment_index) else {
                self.completed = true;
                return Some(RevealEvent::Complete);
            };

            if let Some(c) = segment.text[self.byte_offset..].chars().next() {
                if self.char_index == 0 {
                    self.visible.push(FormattedSegment {
                        text: String::new(),
                        emphasized: segment.emphasized,
                    });
                }
                if let Some(current) = self.visible.last_mut() {
                    current.text.push(c);
                }
                self.byte_offset += c.len_utf8();
                self.char_index += 1;
                return Some(RevealEvent::Snapshot(self.state()));
            }

            // Segment exhausted, move on without emitting
            self.segment_index += 1;
            self.byte_offset = 0;
            self.char_index = 0;
        }
    }

    pub fn state(&self) -> RevealState {
        RevealState {
            segment_index: self.segment_index,
            char_index: self.char_index,
            byte_offset: self.byte_offset,
            segments: Arc::clone(&self.segments),
        }
    }

    /// What has been revealed so far, grown in place one character at a time
    pub fn visible(&self) -> &[FormattedSegment] {
        &self.visible
    }

    pub fn segments(&self) -> &[FormattedSegment] {
        &self.segments
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn total_chars(&self) -> usize {
        self.segments.iter().map(FormattedSegment::char_count).sum()
    }
}

impl Iterator for Typewriter {
    type Item = RevealEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

impl std::iter::FusedIterator for Typewriter {}
