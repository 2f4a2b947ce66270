use crate::{dataset::TaggedSentence, Result};

/// Output of tagging one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub tagged: TaggedSentence,
    /// Whether the tag of each position came from the guesser.
    pub guessed: Vec<bool>,
    /// Positions whose scores were all zero.
    pub unknown_count: usize,
    /// Unknown positions the guesser produced a tag for.
    pub guess_count: usize,
}

pub trait Tagger {
    /// Tags `words`, which must not be empty.
    fn tag(&self, words: &[String]) -> Result<Decoded>;
}
