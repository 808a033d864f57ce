//! Sentence segmentation for incremental speech output.
//!
//! Text arrives in arbitrary fragments (a streamed LLM reply, or one whole
//! completion). The [`Segmenter`] cuts it at major punctuation so each
//! sentence can be handed to the synthesizer as soon as it is complete,
//! without waiting for the rest of the reply.

/// Major sentence terminators, ASCII and full-width.
pub const TERMINATORS: [char; 8] = ['.', '!', '?', ';', '。', '！', '？', '；'];

/// Whether `c` closes a segment.
pub fn is_terminator(c: char) -> bool {
    TERMINATORS.contains(&c)
}

/// Whether a closed segment carries anything worth speaking.
///
/// Whitespace and the terminators themselves do not count, so `"   ;"` or a
/// bare `"."` is dropped.
pub fn is_speakable(segment: &str) -> bool {
    !segment
        .trim_matches(|c: char| c.is_whitespace() || is_terminator(c))
        .is_empty()
}

/// Incremental punctuation-based segmenter.
///
/// Segments are emitted verbatim (leading whitespace is kept); a segment is
/// only emitted when [`is_speakable`] holds. Whatever follows the last
/// terminator stays pending until more text arrives or [`Segmenter::finish`]
/// is called.
#[derive(Debug, Default)]
pub struct Segmenter {
    pending: String,
    emitted: usize,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment, calling `emit` for every segment it closes.
    pub fn push<F>(&mut self, fragment: &str, mut emit: F)
    where
        F: FnMut(String),
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if !is_terminator(c) {
                continue;
            }
            let end = i + c.len_utf8();
            self.pending.push_str(&fragment[start..end]);
            start = end;

            let segment = std::mem::take(&mut self.pending);
            if is_speakable(&segment) {
                self.emitted += 1;
                emit(segment);
            }
        }
        self.pending.push_str(&fragment[start..]);
    }

    /// Flush the trailing remainder, if it holds anything besides whitespace.
    ///
    /// Returns the total number of segments emitted over the segmenter's life.
    pub fn finish<F>(mut self, mut emit: F) -> usize
    where
        F: FnMut(String),
    {
        let rest = std::mem::take(&mut self.pending);
        if is_speakable(&rest) {
            self.emitted += 1;
            emit(rest);
        }
        self.emitted
    }

    /// Text received since the last closed segment.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Segments emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

/// Segment a complete text in one pass.
pub fn split_segments(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut segmenter = Segmenter::new();
    segmenter.push(text, |s| out.push(s));
    segmenter.finish(|s| out.push(s));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(fragments: &[&str]) -> (Vec<String>, Vec<String>) {
        let mut during = Vec::new();
        let mut segmenter = Segmenter::new();
        for f in fragments {
            segmenter.push(f, |s| during.push(s));
        }
        let mut after = Vec::new();
        segmenter.finish(|s| after.push(s));
        (during, after)
    }

    #[test]
    fn test_segments_across_fragment_boundaries() {
        let (during, after) = run(&["Hello wor", "ld. How", " are you? Fi", "ne!"]);
        assert_eq!(during, vec!["Hello world.", " How are you?", " Fine!"]);
        assert!(after.is_empty());
    }

    #[test]
    fn test_multiple_terminators_in_one_fragment() {
        let (during, after) = run(&["Hello world. How are you? Fine!"]);
        assert_eq!(during, vec!["Hello world.", " How are you?", " Fine!"]);
        assert!(after.is_empty());
    }

    #[test]
    fn test_remainder_only_flushed_on_finish() {
        let mut segmenter = Segmenter::new();
        let mut out = Vec::new();
        segmenter.push("no terminator ", |s| out.push(s));
        segmenter.push("here", |s| out.push(s));
        assert!(out.is_empty());
        assert_eq!(segmenter.pending(), "no terminator here");

        let total = segmenter.finish(|s| out.push(s));
        assert_eq!(out, vec!["no terminator here"]);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_whitespace_segment_is_dropped() {
        let (during, after) = run(&["   ;   "]);
        assert!(during.is_empty());
        assert!(after.is_empty());
    }

    #[test]
    fn test_bare_terminators_produce_nothing() {
        let (during, after) = run(&["...", "!?", " ; ;"]);
        assert!(during.is_empty());
        assert!(after.is_empty());
    }

    #[test]
    fn test_ellipsis_after_content() {
        let out = split_segments("Well... maybe.");
        assert_eq!(out, vec!["Well.", " maybe."]);
    }

    #[test]
    fn test_full_width_terminators() {
        let out = split_segments("你好。今天怎么样？很好！还有；结束");
        assert_eq!(out, vec!["你好。", "今天怎么样？", "很好！", "还有；", "结束"]);
    }

    #[test]
    fn test_no_abbreviation_heuristics() {
        let out = split_segments("It costs 3.50 dollars.");
        assert_eq!(out, vec!["It costs 3.", "50 dollars."]);
    }

    #[test]
    fn test_split_segments_empty_input() {
        assert!(split_segments("").is_empty());
        assert!(split_segments("   \n ").is_empty());
    }
}
