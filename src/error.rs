use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tag string outside the treebank tag set.
    #[error("invalid tag {tag:?} at line {line}")]
    InvalidTag { line: usize, tag: String },

    #[error("cannot tag an empty sentence")]
    EmptySentence,

    #[error("corpus contains no sentences")]
    EmptyCorpus,

    #[error("invalid argument {arg}: {msg}")]
    InvalidArgument { arg: &'static str, msg: String },

    /// Decoded output diverged from the reference it is compared against.
    #[error("alignment error in sentence #{sentence} at position {position}: {msg}")]
    Alignment {
        sentence: usize,
        position: usize,
        msg: String,
    },
}

impl Error {
    pub(crate) fn invalid_argument<S: Into<String>>(arg: &'static str, msg: S) -> Self {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }

    pub(crate) fn alignment<S: Into<String>>(sentence: usize, position: usize, msg: S) -> Self {
        Self::Alignment {
            sentence,
            position,
            msg: msg.into(),
        }
    }
}
