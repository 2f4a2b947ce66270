#![allow(non_snake_case)]

pub mod dataset;
mod error;
pub mod evaluation;
pub mod harness;
pub mod hmm;
pub mod quark;

pub use dataset::{Corpus, Format, TaggedSentence};
pub use error::{Error, Result};
pub use evaluation::{Estimation, Evaluation};
pub use harness::{cross_validate, CrossValidation, HarnessConfig};
pub use hmm::{
    bigram::tagger::{BigramTagger, DecoderConfig, Search},
    fixer::RewriteOrder,
    guesser::{Guesser, Lexicon},
    model::{Model, Variant},
    tag::{Tag, TagSet},
    tagger::{Decoded, Tagger},
};
