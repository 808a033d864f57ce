//! Speech-side building blocks: the sink contract text segments are handed
//! to, and the sentence segmenter that decides where a segment ends.

mod segment;
mod sink;

pub use segment::{is_speakable, is_terminator, split_segments, Segmenter, TERMINATORS};
pub use sink::{ChannelSink, CollectingSink, SpeechSink, DEFAULT_SESSION};
