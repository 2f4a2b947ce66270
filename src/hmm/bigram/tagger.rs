use serde::{Deserialize, Serialize};

use crate::{
    dataset::TaggedSentence,
    hmm::{
        fixer::{self, RewriteOrder},
        guesser::Guesser,
        model::{Model, Variant},
        tag::Tag,
        tagger::{Decoded, Tagger},
        token::is_capitalized,
    },
    Error, Result,
};

use super::context::Lattice;

/// Tokens after which the path score handed to the guesser is not trusted.
const LIGHT_PUNCTUATION: [&str; 3] = [",", "``", "''"];

/// Predecessor search of the decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Search {
    /// Only the tags achieving the previous column's maximum are considered as
    /// predecessors, and among them the one with the highest transition probability
    /// is taken. An approximation of Viterbi.
    #[default]
    Frontier,
    /// Every tag is a predecessor candidate, scored by its path score times the
    /// transition probability. Exact Viterbi.
    Exhaustive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub search: Search,
    pub fix_order: RewriteOrder,
    /// Skip the consistency pass over guessed tags.
    pub no_fix: bool,
}

pub struct BigramTagger<'a> {
    model: &'a Model,
    guesser: Guesser,
    config: DecoderConfig,
}

impl<'a> BigramTagger<'a> {
    pub fn new(model: &'a Model, guesser: Guesser, config: DecoderConfig) -> Self {
        Self {
            model,
            guesser,
            config,
        }
    }

    pub fn model(&self) -> &Model {
        self.model
    }

    /// Picks the predecessor of `tag` at position t, returning its index and the score of
    /// the path through it before the emission is applied.
    fn predecessor(&self, lattice: &Lattice, t: usize, tag: Tag, frontier: &[usize]) -> (usize, f64) {
        let tags = self.model.tags();
        match self.config.search {
            Search::Frontier => {
                let mut best = frontier[0];
                let mut max_trans = f64::MIN;
                for &k in frontier {
                    let trans = self.model.transition(tag, tags.get(k));
                    if max_trans < trans {
                        max_trans = trans;
                        best = k;
                    }
                }
                (best, lattice.score(t - 1, best) * max_trans)
            }
            Search::Exhaustive => {
                let mut best = 0;
                let mut max_score = f64::MIN;
                for k in 0..tags.len() {
                    let score = lattice.score(t - 1, k) * self.model.transition(tag, tags.get(k));
                    if max_score < score {
                        max_score = score;
                        best = k;
                    }
                }
                (best, max_score)
            }
        }
    }

    /// Fills the lattice of `words`, smoothing every all-zero column.
    fn fill(&self, words: &[String]) -> Result<(Lattice, usize, usize)> {
        if words.is_empty() {
            return Err(Error::EmptySentence);
        }
        let model = self.model;
        let tags = model.tags();
        if tags.is_empty() {
            return Err(Error::invalid_argument("tags", "the model scores no tags"));
        }
        let L = tags.len();
        let mut lattice = Lattice::new(L, words.len());
        // scores of the current position without the emission probability
        let mut row = vec![0.0; L];
        let mut frontier = Vec::new();
        let mut unknown_count = 0;
        let mut guess_count = 0;

        for (t, word) in words.iter().enumerate() {
            let lower = word.to_lowercase();
            if t == 0 {
                // capitalization carries no information on the first word
                for (i, tag) in tags.iter().enumerate() {
                    let trans = model.transition(tag, Tag::SentenceStart);
                    let score = trans * model.emission(&lower, tag, Variant::Folded);
                    lattice.set(0, i, score, None);
                    row[i] = trans;
                }
            } else {
                let capitalized = is_capitalized(word);
                let after_light = LIGHT_PUNCTUATION.contains(&words[t - 1].as_str());
                for (i, tag) in tags.iter().enumerate() {
                    let (k, path) = self.predecessor(&lattice, t, tag, &frontier);
                    let emission = if capitalized {
                        model.emission(word, tag, Variant::Preserved)
                    } else if tag == Tag::ProperNoun {
                        0.0
                    } else {
                        model.emission(&lower, tag, Variant::Folded)
                    };
                    lattice.set(t, i, path * emission, Some(k));
                    row[i] = if after_light { 0.0 } else { path };
                }
            }

            if lattice.is_zero(t) {
                unknown_count += 1;
                let guess = self.guesser.guess(model, tags, word, &row);
                let position = guess.and_then(|tag| tags.position(tag));
                match (guess, position) {
                    (Some(tag), Some(_)) => {
                        guess_count += 1;
                        log::debug!("unknown word {word:?} at #{t}: guessed {tag}");
                    }
                    (Some(tag), None) => {
                        log::debug!("unknown word {word:?} at #{t}: guessed {tag} outside the tag set")
                    }
                    (None, _) => log::debug!("unknown word {word:?} at #{t}: no guess"),
                }
                lattice.smooth(t, position);
            }
            frontier = lattice.frontier(t);
        }
        Ok((lattice, unknown_count, guess_count))
    }

    /// Runs the decoder without the consistency pass.
    pub fn decode(&self, words: &[String]) -> Result<Decoded> {
        let (lattice, unknown_count, guess_count) = self.fill(words)?;
        let tags = self.model.tags();
        let tagged = words
            .iter()
            .cloned()
            .zip(lattice.backtrace().into_iter().map(|i| tags.get(i)))
            .collect::<TaggedSentence>();
        Ok(Decoded {
            tagged,
            guessed: lattice.guessed().to_vec(),
            unknown_count,
            guess_count,
        })
    }
}

impl<'a> Tagger for BigramTagger<'a> {
    fn tag(&self, words: &[String]) -> Result<Decoded> {
        let mut decoded = self.decode(words)?;
        if !self.config.no_fix {
            decoded.tagged.tags = fixer::fix(&decoded.tagged.tags, &decoded.guessed, self.config.fix_order);
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::{Corpus, Format},
        hmm::tag::TagSet,
    };

    fn model() -> Model {
        let s = "The/DT dog/NN barks/VBZ ./.\n\
                 The/DT cat/NN sleeps/VBZ ./.\n\
                 A/DT dog/NN sees/VBZ the/DT cat/NN ./.\n\
                 John/NNP sees/VBZ a/DT dog/NN ,/, and/CC Mary/NNP sleeps/VBZ ./.\n\
                 Dogs/NNS bark/VBP ./.\n";
        Model::from_sentences(&Corpus::read(s.as_bytes(), Format::Slash).unwrap().sentences)
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn tagger(model: &Model) -> BigramTagger<'_> {
        BigramTagger::new(model, Guesser::default(), DecoderConfig::default())
    }

    #[test]
    fn tags_known_sentence() {
        let model = model();
        let decoded = tagger(&model).tag(&words("The cat sees a dog .")).unwrap();
        assert_eq!(
            vec![Tag::Determiner, Tag::Noun, Tag::ThirdPersonVerb, Tag::Determiner, Tag::Noun, Tag::Terminal],
            decoded.tagged.tags
        );
        assert_eq!(0, decoded.unknown_count);
        assert!(decoded.guessed.iter().all(|&g| !g));
    }

    #[test]
    fn capitalized_words_use_preserved_table() {
        let model = model();
        let decoded = tagger(&model).tag(&words("A dog , and Mary sleeps .")).unwrap();
        assert_eq!(Tag::ProperNoun, decoded.tagged.tags[4]);
        assert!(!decoded.guessed[4]);

        // proper nouns are ruled out for lowercase words, the guesser falls back to NN
        let decoded = tagger(&model).tag(&words("A dog , and mary sleeps .")).unwrap();
        assert_eq!(Tag::Noun, decoded.tagged.tags[4]);
        assert!(decoded.guessed[4]);
    }

    #[test]
    fn empty_sentence_is_an_error() {
        let model = model();
        assert!(matches!(tagger(&model).tag(&[]), Err(Error::EmptySentence)));
    }

    #[test]
    fn unknown_plural_is_guessed() {
        let model = model();
        let decoded = tagger(&model).tag(&words("The cats sleep .")).unwrap();
        assert_eq!(Tag::PluralNoun, decoded.tagged.tags[1]);
        assert!(decoded.guessed[1]);
        assert!(decoded.unknown_count >= 1);
        assert!(decoded.guess_count >= 1);
    }

    #[test]
    fn preserves_tokens_and_is_idempotent() {
        let model = model();
        let tagger = tagger(&model);
        for s in ["The dog barks .", "Blorp zing , quux the Cat !", "sees", "1999 Dogs flew -- away"] {
            let input = words(s);
            let a = tagger.tag(&input).unwrap();
            let b = tagger.tag(&input).unwrap();
            assert_eq!(input, a.tagged.words);
            assert_eq!(input.len(), a.guessed.len());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn smoothed_columns_are_never_zero() {
        let model = model();
        let tagger = tagger(&model);
        for s in ["Blorp zing , quux the Cat !", "The dog barks .", "flarn"] {
            let (lattice, _, _) = tagger.fill(&words(s)).unwrap();
            for t in 0..lattice.num_items() {
                assert!(!lattice.is_zero(t), "{s}: column {t}");
            }
        }
    }

    #[test]
    fn no_guess_gives_uniform_column() {
        let model = model();
        let (lattice, unknown, guessed) = tagger(&model).fill(&words("flarn")).unwrap();
        assert_eq!(1, unknown);
        let uniform = 1.0 / model.tags().len() as f64;
        // the path fallback picks the most likely sentence-initial tag
        assert_eq!(1, guessed);
        assert!(lattice.column(0).iter().any(|&s| s != uniform));

        let (lattice, _, guessed) = tagger(&model).fill(&words("the dog , flarn")).unwrap();
        // path scores after a comma are not trusted
        assert_eq!(0, guessed);
        assert!(lattice.column(3).iter().all(|&s| s == uniform));
    }

    #[test]
    fn frontier_and_exhaustive_agree_on_clear_input() {
        let model = model();
        let exhaustive = BigramTagger::new(
            &model,
            Guesser::default(),
            DecoderConfig {
                search: Search::Exhaustive,
                ..Default::default()
            },
        );
        let input = words("A cat sees the dog .");
        assert_eq!(
            tagger(&model).tag(&input).unwrap().tagged,
            exhaustive.tag(&input).unwrap().tagged
        );
    }

    #[test]
    fn frontier_restricts_predecessors() {
        let s = "a/DT x/JJ\n\
                 a/NN y/VB\n\
                 a/NN y/VB\n\
                 b/JJ x/JJ\n";
        let model = Model::from_sentences(&Corpus::read(s.as_bytes(), Format::Slash).unwrap().sentences);
        let input = words("a x");

        // NN alone achieves the maximum at "a", and nothing follows NN with "x"
        let decoded = tagger(&model).tag(&input).unwrap();
        assert_eq!(vec![Tag::Noun, Tag::Verb], decoded.tagged.tags);
        assert_eq!(vec![false, true], decoded.guessed);
        assert_eq!(1, decoded.guess_count);

        let exhaustive = BigramTagger::new(
            &model,
            Guesser::default(),
            DecoderConfig {
                search: Search::Exhaustive,
                ..Default::default()
            },
        );
        let decoded = exhaustive.tag(&input).unwrap();
        assert_eq!(vec![Tag::Determiner, Tag::Adjective], decoded.tagged.tags);
        assert_eq!(vec![false, false], decoded.guessed);
    }

    #[test]
    fn frontier_ties_take_the_first_tag() {
        // DT and NN tie at "a"; both reach VB with "y", DT comes first
        let s = "a/DT y/VB\n\
                 a/NN y/VB\n";
        let model = Model::from_sentences(&Corpus::read(s.as_bytes(), Format::Slash).unwrap().sentences);
        let (lattice, _, _) = tagger(&model).fill(&words("a y")).unwrap();
        let tags = model.tags();
        let dt = tags.position(Tag::Determiner).unwrap();
        let nn = tags.position(Tag::Noun).unwrap();
        assert!(dt < nn);
        assert_eq!(vec![dt, nn], lattice.frontier(0));

        let decoded = tagger(&model).tag(&words("a y")).unwrap();
        assert_eq!(vec![Tag::Determiner, Tag::Verb], decoded.tagged.tags);
    }

    #[test]
    fn empty_tag_set_is_an_error() {
        let model = Model::train(TagSet::new(&[]), &[]);
        assert!(matches!(
            tagger(&model).tag(&words("a dog")),
            Err(Error::InvalidArgument { arg: "tags", .. })
        ));
    }

    #[test]
    fn no_fix_keeps_decoder_output() {
        let model = model();
        let raw = BigramTagger::new(
            &model,
            Guesser::default(),
            DecoderConfig {
                no_fix: true,
                ..Default::default()
            },
        );
        let input = words("The dog sees");
        assert_eq!(raw.decode(&input).unwrap(), raw.tag(&input).unwrap());
    }
}
