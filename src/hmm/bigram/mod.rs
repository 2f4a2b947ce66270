pub(crate) mod context;
pub mod tagger;
