use std::collections::HashMap;

use crate::{
    dataset::TaggedSentence,
    quark::{Quark, StringTable},
};

use super::tag::{Tag, TagSet};

/// Which emission table to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Tokens lowercased before counting.
    Folded,
    /// Tokens counted as written.
    Preserved,
}

/// P(token | tag) over the tokens observed with each tag.
#[derive(Debug, Default, Clone)]
struct EmissionTable {
    vocab: Quark,
    /// Indexed by `Tag::index`, token id -> relative frequency.
    probs: Vec<HashMap<usize, f64>>,
}

impl EmissionTable {
    fn new() -> Self {
        Self {
            vocab: Quark::default(),
            probs: vec![HashMap::new(); Tag::COUNT],
        }
    }

    fn add(&mut self, token: &str, tag: Tag) {
        let id = self.vocab.find_or_insert(token);
        *self.probs[tag.index()].entry(id).or_default() += 1.0;
    }

    fn normalize(&mut self) {
        for row in &mut self.probs {
            let total: f64 = row.values().sum();
            if total > 0.0 {
                row.values_mut().for_each(|v| *v /= total);
            }
        }
    }

    #[inline]
    fn get(&self, token: &str, tag: Tag) -> f64 {
        self.vocab
            .to_id(token)
            .and_then(|id| self.probs[tag.index()].get(&id))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Bigram hidden Markov model: emission and transition relative frequencies.
///
/// Tables are built once by [`Model::train`] and never change afterwards.
#[derive(Debug, Clone)]
pub struct Model {
    tags: TagSet,
    folded: EmissionTable,
    preserved: EmissionTable,
    /// This is a [Tag::COUNT][Tag::COUNT] matrix whose element [i][j] is P(j | i).
    trans: Vec<f64>,
    num_sentences: usize,
}

impl Model {
    /// Trains the tables on `sentences`, scoring the tags of `tags` at decode time.
    ///
    /// Every sentence is counted with a leading `("^", SentenceStart)` pair so that
    /// transitions out of [`Tag::SentenceStart`] carry the sentence-initial statistics.
    pub fn train<'a, I>(tags: TagSet, sentences: I) -> Self
    where
        I: IntoIterator<Item = &'a TaggedSentence>,
    {
        const L: usize = Tag::COUNT;
        let mut folded = EmissionTable::new();
        let mut preserved = EmissionTable::new();
        let mut trans = vec![0.0; L * L];
        let mut num_sentences = 0;

        let start = Tag::SentenceStart.as_str();
        for seq in sentences {
            folded.add(start, Tag::SentenceStart);
            preserved.add(start, Tag::SentenceStart);
            let mut prev = Tag::SentenceStart;
            for (word, tag) in seq.iter() {
                folded.add(&word.to_lowercase(), tag);
                preserved.add(word, tag);
                trans[L * prev.index() + tag.index()] += 1.0;
                prev = tag;
            }
            num_sentences += 1;
        }

        folded.normalize();
        preserved.normalize();
        for row in trans.chunks_mut(L) {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.iter_mut().for_each(|v| *v /= total);
            }
        }

        let model = Self {
            tags,
            folded,
            preserved,
            trans,
            num_sentences,
        };
        log::info!(
            "trained model (sentences: {}, tags: {}, folded vocab: {}, preserved vocab: {})",
            model.num_sentences,
            model.tags.len(),
            model.folded.vocab.len(),
            model.preserved.vocab.len()
        );
        model
    }

    /// Trains on `sentences` with the tag set they define.
    pub fn from_sentences(sentences: &[TaggedSentence]) -> Self {
        Self::train(TagSet::from_sentences(sentences), sentences)
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn num_sentences(&self) -> usize {
        self.num_sentences
    }

    pub fn vocab_size(&self, variant: Variant) -> usize {
        self.table(variant).vocab.len()
    }

    #[inline]
    fn table(&self, variant: Variant) -> &EmissionTable {
        match variant {
            Variant::Folded => &self.folded,
            Variant::Preserved => &self.preserved,
        }
    }

    /// P(token | tag); zero for a token never seen with `tag`.
    ///
    /// The token is looked up as given, callers lowercase it for [`Variant::Folded`].
    #[inline]
    pub fn emission(&self, token: &str, tag: Tag, variant: Variant) -> f64 {
        self.table(variant).get(token, tag)
    }

    /// P(next | prev); zero for a pair never observed.
    #[inline]
    pub fn transition(&self, next: Tag, prev: Tag) -> f64 {
        self.trans[Tag::COUNT * prev.index() + next.index()]
    }

    /// The tokens observed with `tag` and their probabilities.
    pub fn emissions(&self, tag: Tag, variant: Variant) -> impl Iterator<Item = (&str, f64)> + '_ {
        let table = self.table(variant);
        table.probs[tag.index()]
            .iter()
            .filter_map(move |(&id, &p)| table.vocab.to_str(id).map(|s| (s, p)))
    }

    /// P(* | prev) indexed by `Tag::index`.
    pub fn transitions_from(&self, prev: Tag) -> &[f64] {
        let offset = Tag::COUNT * prev.index();
        &self.trans[offset..offset + Tag::COUNT]
    }
}
