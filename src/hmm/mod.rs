pub mod bigram;
pub mod fixer;
pub mod guesser;
pub mod model;
pub mod tag;
pub mod tagger;
pub mod token;
