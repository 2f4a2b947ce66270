use serde::{Deserialize, Serialize};

use super::tag::Tag;

/// When the `UNK` -> `NN` rewrite happens relative to the context rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteOrder {
    /// Each position is rewritten after its own context rules ran, so a right neighbour
    /// still reads as `UNK` while the left one has already been rewritten.
    #[default]
    ContextFirst,
    /// Every `UNK` is rewritten before any context rule runs.
    UnknownFirst,
}

const NOUNS_OR_ADJECTIVE: [Tag; 6] = [
    Tag::ProperNoun,
    Tag::PluralProperNoun,
    Tag::Noun,
    Tag::PluralNoun,
    Tag::Adjective,
    Tag::Possessive,
];

/// Corrects systematic guessing errors using the neighbouring tags.
///
/// Only positions whose `guessed` flag is set are subject to the context rules; the
/// rules read the working array left to right.
///
/// # Panics
///
/// Panics if `tags` and `guessed` differ in length.
pub fn fix(tags: &[Tag], guessed: &[bool], order: RewriteOrder) -> Vec<Tag> {
    assert_eq!(tags.len(), guessed.len(), "tags and guess flags differ in length");
    let mut tags = tags.to_vec();
    if order == RewriteOrder::UnknownFirst {
        tags.iter_mut().filter(|t| **t == Tag::Unknown).for_each(|t| *t = Tag::Noun);
    }
    let n = tags.len();
    for j in 0..n {
        if guessed[j] && j > 0 {
            let prev = tags[j - 1];
            if j < n - 1 {
                let next = tags[j + 1];
                if matches!(prev, Tag::Determiner | Tag::Adjective)
                    && (NOUNS_OR_ADJECTIVE.contains(&next)
                        || (guessed[j + 1] && next == Tag::Preposition))
                {
                    tags[j] = Tag::Adjective;
                } else if guessed[j - 1] && tags[j] == Tag::Preposition && next == Tag::Comma {
                    tags[j] = Tag::Noun;
                }
            }
            if matches!(tags[j], Tag::Noun | Tag::PluralNoun) && prev == Tag::Adverb {
                tags[j] = Tag::Adjective;
            } else if matches!(prev, Tag::ComparativeAdverb | Tag::ComparativeAdjective)
                && tags[j] == Tag::PastParticiple
            {
                tags[j] = Tag::Adjective;
            }
        }
        if tags[j] == Tag::Unknown {
            tags[j] = Tag::Noun;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use Tag::*;

    #[test]
    fn unknown_between_determiner_and_noun() {
        let tags = [Determiner, Unknown, Noun];
        let guessed = [false, true, false];
        // the context rule sees UNK and rewrites it to JJ before the UNK rule applies
        assert_eq!(vec![Determiner, Adjective, Noun], fix(&tags, &guessed, RewriteOrder::ContextFirst));
        // UNK becomes NN first, then the context rule still makes it JJ
        assert_eq!(vec![Determiner, Adjective, Noun], fix(&tags, &guessed, RewriteOrder::UnknownFirst));
    }

    #[test]
    fn unknown_right_neighbour_depends_on_order() {
        let tags = [Determiner, Noun, Unknown, Terminal];
        let guessed = [false, true, false, false];
        assert_eq!(
            vec![Determiner, Noun, Noun, Terminal],
            fix(&tags, &guessed, RewriteOrder::ContextFirst)
        );
        assert_eq!(
            vec![Determiner, Adjective, Noun, Terminal],
            fix(&tags, &guessed, RewriteOrder::UnknownFirst)
        );
    }

    #[test]
    fn unknown_is_rewritten_regardless_of_guess() {
        let tags = [Unknown, Verb, Unknown];
        let guessed = [false; 3];
        assert_eq!(vec![Noun, Verb, Noun], fix(&tags, &guessed, RewriteOrder::ContextFirst));
    }

    #[test]
    fn unguessed_positions_are_kept() {
        let tags = [Determiner, Noun, Noun];
        assert_eq!(tags.to_vec(), fix(&tags, &[false; 3], RewriteOrder::ContextFirst));
    }

    #[test]
    fn guessed_preposition_before_guessed_preposition() {
        let tags = [Adjective, Verb, Preposition, Terminal];
        let guessed = [false, true, true, false];
        assert_eq!(
            vec![Adjective, Adjective, Preposition, Terminal],
            fix(&tags, &guessed, RewriteOrder::ContextFirst)
        );
    }

    #[test]
    fn preposition_before_comma() {
        let tags = [Verb, Preposition, Comma];
        let guessed = [true, true, false];
        assert_eq!(vec![Verb, Noun, Comma], fix(&tags, &guessed, RewriteOrder::ContextFirst));
        // previous tag not guessed
        assert_eq!(tags.to_vec(), fix(&tags, &[false, true, false], RewriteOrder::ContextFirst));
    }

    #[test]
    fn noun_after_adverb_at_last_position() {
        let tags = [Adverb, PluralNoun];
        assert_eq!(vec![Adverb, Adjective], fix(&tags, &[false, true], RewriteOrder::ContextFirst));
    }

    #[test]
    fn participle_after_comparative() {
        let tags = [ComparativeAdverb, PastParticiple, Terminal];
        assert_eq!(
            vec![ComparativeAdverb, Adjective, Terminal],
            fix(&tags, &[false, true, false], RewriteOrder::ContextFirst)
        );
        let tags = [ComparativeAdjective, PastParticiple];
        assert_eq!(
            vec![ComparativeAdjective, Adjective],
            fix(&tags, &[false, true], RewriteOrder::ContextFirst)
        );
    }

    #[test]
    #[should_panic(expected = "differ in length")]
    fn mismatched_flags_panic() {
        fix(&[Noun, Noun], &[true], RewriteOrder::ContextFirst);
    }

    #[test]
    fn first_position_only_gets_unknown_rule() {
        let tags = [PastParticiple, Noun];
        assert_eq!(tags.to_vec(), fix(&tags, &[true, false], RewriteOrder::ContextFirst));
    }
}
