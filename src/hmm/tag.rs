use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::dataset::TaggedSentence;

macro_rules! tags {
    ($($(#[$doc:meta])* $name:ident => $s:literal,)+) => {
        /// Penn Treebank part-of-speech tags, plus the synthetic tags used by the tagger.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Tag {
            $($(#[$doc])* #[serde(rename = $s)] $name,)+
        }

        impl Tag {
            pub const ALL: &'static [Tag] = &[$(Tag::$name,)+];
            pub const COUNT: usize = Self::ALL.len();

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Tag::$name => $s,)+
                }
            }
        }

        impl FromStr for Tag {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Tag::$name),)+
                    _ => Err(s.to_string()),
                }
            }
        }
    };
}

tags! {
    CoordinatingConjunction => "CC",
    Cardinal => "CD",
    Determiner => "DT",
    Existential => "EX",
    ForeignWord => "FW",
    Preposition => "IN",
    Adjective => "JJ",
    ComparativeAdjective => "JJR",
    SuperlativeAdjective => "JJS",
    ListMarker => "LS",
    Modal => "MD",
    Noun => "NN",
    PluralNoun => "NNS",
    ProperNoun => "NNP",
    PluralProperNoun => "NNPS",
    Predeterminer => "PDT",
    Possessive => "POS",
    PersonalPronoun => "PRP",
    PossessivePronoun => "PRP$",
    Adverb => "RB",
    ComparativeAdverb => "RBR",
    SuperlativeAdverb => "RBS",
    Particle => "RP",
    Symbol => "SYM",
    To => "TO",
    Interjection => "UH",
    Verb => "VB",
    PastVerb => "VBD",
    Gerund => "VBG",
    PastParticiple => "VBN",
    PresentVerb => "VBP",
    ThirdPersonVerb => "VBZ",
    WhDeterminer => "WDT",
    WhPronoun => "WP",
    PossessiveWhPronoun => "WP$",
    WhAdverb => "WRB",
    Pound => "#",
    Dollar => "$",
    OpenQuote => "``",
    CloseQuote => "''",
    OpenParen => "(",
    CloseParen => ")",
    Comma => ",",
    Dash => "--",
    Terminal => ".",
    Colon => ":",
    /// Empty element marker of the treebank.
    Empty => "-NONE-",
    /// Marks the position before the first word of a sentence.
    SentenceStart => "^",
    /// Placeholder for words the tagger could not resolve.
    Unknown => "UNK",
}

/// Tags added to every tag set, whether or not the corpus contains them.
pub const RARE_TAGS: [Tag; 2] = [Tag::Dash, Tag::Unknown];

impl Tag {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parses a treebank tag; ambiguous annotations such as `JJ|VBN` take the first alternative.
    pub fn parse_treebank(s: &str) -> Option<Self> {
        let s = s.split_once('|').map_or(s, |(first, _)| first);
        s.parse().ok()
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered tags a model scores. The order fixes lattice rows and tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
    index: Vec<Option<usize>>,
}

impl TagSet {
    pub fn new(tags: &[Tag]) -> Self {
        let mut this = Self {
            tags: Vec::with_capacity(tags.len()),
            index: vec![None; Tag::COUNT],
        };
        for &tag in tags {
            this.insert(tag);
        }
        this
    }

    /// Collects the tags in order of first appearance, then appends the sentence start marker
    /// and the rare tags.
    pub fn from_sentences<'a, I>(sentences: I) -> Self
    where
        I: IntoIterator<Item = &'a TaggedSentence>,
    {
        let mut this = Self::new(&[]);
        for sentence in sentences {
            for &tag in &sentence.tags {
                this.insert(tag);
            }
        }
        this.insert(Tag::SentenceStart);
        for tag in RARE_TAGS {
            this.insert(tag);
        }
        this
    }

    fn insert(&mut self, tag: Tag) {
        if self.index[tag.index()].is_none() {
            self.index[tag.index()] = Some(self.tags.len());
            self.tags.push(tag);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Tag {
        self.tags[i]
    }

    #[inline]
    pub fn position(&self, tag: Tag) -> Option<usize> {
        self.index[tag.index()]
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.position(tag).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tags.iter().copied()
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for &tag in Tag::ALL {
            assert_eq!(tag, tag.as_str().parse::<Tag>().unwrap());
        }
        assert_eq!("PRP$", Tag::PossessivePronoun.to_string());
        assert!("XYZ".parse::<Tag>().is_err());
    }

    #[test]
    fn parse_ambiguous() {
        assert_eq!(Some(Tag::Adjective), Tag::parse_treebank("JJ|VBN"));
        assert_eq!(Some(Tag::Terminal), Tag::parse_treebank("."));
        assert_eq!(None, Tag::parse_treebank("?"));
    }

    #[test]
    fn tag_set_order() {
        let mut s = TaggedSentence::default();
        s.push("The".into(), Tag::Determiner);
        s.push("dog".into(), Tag::Noun);
        s.push("barks".into(), Tag::ThirdPersonVerb);
        s.push("the".into(), Tag::Determiner);
        let tags = TagSet::from_sentences([&s]);
        assert_eq!(
            tags.as_slice(),
            &[
                Tag::Determiner,
                Tag::Noun,
                Tag::ThirdPersonVerb,
                Tag::SentenceStart,
                Tag::Dash,
                Tag::Unknown
            ]
        );
        assert_eq!(Some(1), tags.position(Tag::Noun));
        assert_eq!(None, tags.position(Tag::Verb));
    }

    #[test]
    fn serde_uses_treebank_names() {
        let json = serde_json::to_string(&Tag::OpenQuote).unwrap();
        assert_eq!(json, "\"``\"");
        let tag: Tag = serde_json::from_str("\"NNPS\"").unwrap();
        assert_eq!(tag, Tag::PluralProperNoun);
    }
}
