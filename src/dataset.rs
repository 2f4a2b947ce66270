use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{hmm::tag::Tag, Error, Result};

/// An ordered sequence of words with one tag per word.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaggedSentence {
    pub words: Vec<String>,
    pub tags: Vec<Tag>,
}

impl TaggedSentence {
    pub fn push(&mut self, word: String, tag: Tag) {
        self.words.push(word);
        self.tags.push(tag);
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.tags.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Tag)> + '_ {
        self.words.iter().map(String::as_str).zip(self.tags.iter().copied())
    }
}

impl FromIterator<(String, Tag)> for TaggedSentence {
    fn from_iter<I: IntoIterator<Item = (String, Tag)>>(iter: I) -> Self {
        let (words, tags) = iter.into_iter().unzip();
        Self { words, tags }
    }
}

impl Display for TaggedSentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (word, tag)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{word}/{tag}")?;
        }
        Ok(())
    }
}

/// Layout of a tagged corpus file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One sentence per line of whitespace separated `word/TAG` items.
    #[default]
    Slash,
    /// One `word<TAB>TAG` item per line, sentences separated by blank lines.
    Column,
}

#[derive(Debug, Default, Clone)]
pub struct Corpus {
    pub sentences: Vec<TaggedSentence>,
}

impl Corpus {
    pub fn open<P: AsRef<Path>>(path: P, format: Format) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        log::info!("reading corpus {}", path.as_ref().display());
        Self::read(f, format)
    }

    pub fn read<R: Read>(reader: R, format: Format) -> Result<Self> {
        let mut corpus = Corpus::default();
        corpus.read_more(reader, format)?;
        Ok(corpus)
    }

    /// Appends the sentences of another file to the corpus.
    pub fn read_more<R: Read>(&mut self, reader: R, format: Format) -> Result<()> {
        let before = self.sentences.len();
        match format {
            Format::Slash => self.read_slash(reader)?,
            Format::Column => self.read_column(reader)?,
        }
        log::info!(
            "read {} sentences ({} total)",
            self.sentences.len() - before,
            self.sentences.len()
        );
        Ok(())
    }

    fn read_slash<R: Read>(&mut self, reader: R) -> Result<()> {
        for (lineno, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let mut seq = TaggedSentence::default();
            for item in line.split_whitespace() {
                match item.rsplit_once('/') {
                    Some((word, tag)) if !word.is_empty() => {
                        seq.push(word.to_string(), parse_tag(tag, lineno + 1)?)
                    }
                    _ => log::warn!("invalid item at line {}: {item}", lineno + 1),
                }
            }
            if !seq.is_empty() {
                self.sentences.push(seq);
            }
        }
        Ok(())
    }

    fn read_column<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut seq = TaggedSentence::default();
        for (lineno, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                if !seq.is_empty() {
                    self.sentences.push(std::mem::take(&mut seq));
                }
            } else if let Some((word, tag)) = line.split_once('\t') {
                seq.push(word.to_string(), parse_tag(tag.trim(), lineno + 1)?);
            } else {
                log::warn!("invalid line {}: {line}", lineno + 1);
            }
        }
        if !seq.is_empty() {
            self.sentences.push(seq);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.sentences.iter().map(TaggedSentence::len).sum()
    }

    pub fn max_length(&self) -> usize {
        self.sentences.iter().map(TaggedSentence::len).max().unwrap_or_default()
    }
}

fn parse_tag(s: &str, line: usize) -> Result<Tag> {
    Tag::parse_treebank(s).ok_or_else(|| Error::InvalidTag {
        line,
        tag: s.to_string(),
    })
}

fn bound(n: usize, pct: u32) -> usize {
    n * pct as usize / 100
}

/// Takes `window_pct` percent of `sentences` starting at `start_pct` percent, wrapping around
/// the end of the list when the window passes 100%.
///
/// Windows are computed from integer percentage bounds, so two complementary windows
/// (`w` at `s` and `100 - w` at `(s + w) % 100`) partition the list.
pub fn slice<T: Clone>(sentences: &[T], window_pct: u32, start_pct: u32) -> Result<Vec<T>> {
    if window_pct > 100 {
        return Err(Error::invalid_argument("window_pct", format!("{window_pct} > 100")));
    }
    if start_pct >= 100 {
        return Err(Error::invalid_argument("start_pct", format!("{start_pct} >= 100")));
    }
    let n = sentences.len();
    let first = bound(n, start_pct);
    let end_pct = start_pct + window_pct;
    if end_pct > 100 {
        let last = bound(n, end_pct - 100);
        let mut v = sentences[first..].to_vec();
        v.extend_from_slice(&sentences[..last]);
        Ok(v)
    } else {
        Ok(sentences[first..bound(n, end_pct)].to_vec())
    }
}

/// Strips the tags, leaving the words the tagger has to label.
pub fn untagged(sentences: &[TaggedSentence]) -> Vec<Vec<String>> {
    sentences.iter().map(|s| s.words.clone()).collect()
}
