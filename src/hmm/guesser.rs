use std::{collections::HashMap, io::Read};

use serde::{Deserialize, Serialize};

use crate::Result;

use super::{
    model::{Model, Variant},
    tag::{Tag, TagSet},
    token::Shape,
};

/// Closed-class word lists and the punctuation table consulted by the [`Guesser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub determiners: Vec<String>,
    pub prepositions: Vec<String>,
    /// Punctuation tag -> the symbols it covers.
    pub punctuation: Vec<(Tag, Vec<String>)>,
}

fn words(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            determiners: words(&[
                "a", "both", "all", "no", "this", "that", "some", "an", "these", "every", "either",
                "another", "each", "the", "any", "those",
            ]),
            prepositions: words(&[
                "among", "because", "besides", "into", "within", "near", "down", "as", "via",
                "through", "at", "in", "beyond", "between", "if", "throughout", "from", "for",
                "since", "except", "per", "by", "below", "behind", "above", "under", "before",
                "until", "outside", "over", "alongside", "unless", "around", "that", "atop",
                "after", "upon", "but", "next", "although", "despite", "during", "along", "with",
                "than", "on", "about", "off", "like", "unlike", "whether", "of", "up", "against",
                "across", "while", "without", "so", "though", "amid", "toward", "out", "once",
            ]),
            punctuation: vec![
                (Tag::OpenQuote, words(&["`", "``"])),
                (Tag::CloseQuote, words(&["'", "\""])),
                (Tag::OpenParen, words(&["(", "{", "["])),
                (Tag::CloseParen, words(&[")", "}", "]"])),
                (Tag::Comma, words(&[","])),
                (Tag::Dash, words(&["--"])),
                (Tag::Terminal, words(&[".", "!", "?"])),
                (Tag::Colon, words(&[":", ";", "..."])),
            ],
        }
    }
}

impl Lexicon {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Heuristic tagger for tokens the model assigns zero probability under every tag.
#[derive(Debug, Clone)]
pub struct Guesser {
    determiners: Vec<String>,
    prepositions: Vec<String>,
    /// Symbol -> tag, inverted from [`Lexicon::punctuation`].
    punctuation: HashMap<String, Tag>,
}

impl Default for Guesser {
    fn default() -> Self {
        Self::new(Lexicon::default())
    }
}

impl Guesser {
    pub fn new(lexicon: Lexicon) -> Self {
        let punctuation = lexicon
            .punctuation
            .into_iter()
            .flat_map(|(tag, symbols)| symbols.into_iter().map(move |s| (s, tag)))
            .collect();
        Self {
            determiners: lexicon.determiners,
            prepositions: lexicon.prepositions,
            punctuation,
        }
    }

    /// Guesses a tag for `token` from its shape, falling back on `path_scores`, the scores of
    /// each tag of `tags` at this position with the emission probability left out.
    ///
    /// Returns `None` when neither the shape nor the path gives a usable clue.
    pub fn guess(&self, model: &Model, tags: &TagSet, token: &str, path_scores: &[f64]) -> Option<Tag> {
        if let Some(&tag) = self.punctuation.get(token) {
            return Some(tag);
        }
        let shape = Shape::of(token);
        if shape.contains(Shape::HAS_DIGIT) {
            return Some(Tag::Cardinal);
        }
        if shape.contains(Shape::CAPITALIZED) {
            return Some(if shape.contains(Shape::ENDS_S) {
                resolve_s(model, token, shape, Tag::PluralProperNoun)
            } else if shape.contains(Shape::ENDS_ED) {
                resolve_ed(model, token, Tag::PastParticiple)
            } else {
                Tag::ProperNoun
            });
        }
        if shape.contains(Shape::ENDS_S) {
            Some(resolve_s(model, token, shape, Tag::PluralNoun))
        } else if shape.contains(Shape::ENDS_IZE) {
            Some(Tag::Verb)
        } else if shape.contains(Shape::ENDS_ED) {
            Some(resolve_ed(model, token, Tag::PastParticiple))
        } else if shape.contains(Shape::ENDS_LY) {
            Some(Tag::Adverb)
        } else if shape.contains(Shape::ENDS_ING) {
            Some(Tag::Gerund)
        } else if shape.contains(Shape::HAS_HYPHEN) {
            Some(Tag::Adjective)
        } else {
            self.guess_from_path(tags, token, shape, path_scores)
        }
    }

    fn guess_from_path(&self, tags: &TagSet, token: &str, shape: Shape, path_scores: &[f64]) -> Option<Tag> {
        let mut best = None;
        let mut max = 0.0;
        for (i, &score) in path_scores.iter().enumerate() {
            if score > max {
                max = score;
                best = Some(i);
            }
        }
        let tag = tags.get(best?);
        let lower = token.to_lowercase();
        Some(match tag {
            Tag::ProperNoun => Tag::Noun,
            Tag::Determiner if !self.determiners.contains(&lower) => Tag::Noun,
            Tag::Preposition if !self.prepositions.contains(&lower) => Tag::Noun,
            Tag::ComparativeAdverb if shape.contains(Shape::ENDS_ER) => Tag::ComparativeAdjective,
            tag => tag,
        })
    }
}

/// Picks the candidate whose looked-up tag gives `stem` the strictly greatest non-zero
/// folded emission; earlier candidates win ties.
fn best_tag(model: &Model, stem: &str, candidates: &[(Tag, Tag)]) -> Option<Tag> {
    let mut best = None;
    let mut max = 0.0;
    for &(lookup, result) in candidates {
        let p = model.emission(stem, lookup, Variant::Folded);
        if p > max {
            max = p;
            best = Some(result);
        }
    }
    best
}

const S_CANDIDATES: [(Tag, Tag); 2] = [
    (Tag::Noun, Tag::PluralNoun),
    (Tag::Verb, Tag::ThirdPersonVerb),
];

const ED_CANDIDATES: [(Tag, Tag); 3] = [
    (Tag::Noun, Tag::Noun),
    (Tag::Adjective, Tag::Adjective),
    (Tag::Verb, Tag::PastParticiple),
];

const D_CANDIDATES: [(Tag, Tag); 1] = [(Tag::Verb, Tag::PastParticiple)];

/// Resolves a word ending in `s` by looking for its singular or base form:
/// `flies` -> `fly`, `churches` -> `church`, `dogs` -> `dog`.
fn resolve_s(model: &Model, token: &str, shape: Shape, default: Tag) -> Tag {
    let mut stems = Vec::with_capacity(3);
    if shape.contains(Shape::ENDS_IES) {
        stems.push(format!("{}y", &token[..token.len() - 3]));
    }
    if shape.contains(Shape::ENDS_ES) {
        stems.push(token[..token.len() - 2].to_string());
    }
    stems.push(token[..token.len() - 1].to_string());
    stems
        .iter()
        .find_map(|stem| best_tag(model, stem, &S_CANDIDATES))
        .unwrap_or(default)
}

/// Resolves a word ending in `ed`: `walked` -> `walk`, then `chided` -> `chide`.
fn resolve_ed(model: &Model, token: &str, default: Tag) -> Tag {
    best_tag(model, &token[..token.len() - 2], &ED_CANDIDATES)
        .or_else(|| best_tag(model, &token[..token.len() - 1], &D_CANDIDATES))
        .unwrap_or(default)
}
