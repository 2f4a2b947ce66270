use std::{
    collections::BTreeMap,
    io::Write,
    rc::Rc,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{
    dataset::{self, Corpus, TaggedSentence},
    evaluation::{Estimation, Evaluation},
    hmm::{
        bigram::tagger::{BigramTagger, DecoderConfig},
        guesser::{Guesser, Lexicon},
        model::Model,
        tag::{Tag, TagSet},
        tagger::Tagger,
    },
    Error, Result,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Number of cross-validation folds.
    pub folds: u32,
    /// Mistake types occurring more often than this are reported with examples.
    pub mistake_threshold: usize,
    /// Maximum number of example sentences in the report.
    pub max_examples: usize,
    pub decoder: DecoderConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            mistake_threshold: 50,
            max_examples: 20,
            decoder: DecoderConfig::default(),
        }
    }
}

/// A word tagged differently from the gold standard, with both sentence contexts.
#[derive(Debug, Clone)]
pub struct Mistake {
    pub decoded: (String, Tag),
    pub gold: (String, Tag),
    pub decoded_context: Rc<TaggedSentence>,
    pub gold_context: Rc<TaggedSentence>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub words: usize,
    pub unknown: usize,
    pub guessed: usize,
}

impl DecodeStats {
    fn merge(&mut self, other: &DecodeStats) {
        self.words += other.words;
        self.unknown += other.unknown;
        self.guessed += other.guessed;
    }
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Logs the share of sentences done and the elapsed time.
struct Progress {
    total: usize,
    done: usize,
    next_pct: usize,
    begin: Instant,
}

impl Progress {
    const STEP_PCT: usize = 10;

    fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            next_pct: Self::STEP_PCT,
            begin: Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.done += 1;
        let pct = self.done * 100 / self.total.max(1);
        if pct >= self.next_pct || self.done == self.total {
            log::info!(
                "tagged {}% ({} / {}) {:.2}s",
                pct.min(100),
                self.done,
                self.total,
                self.begin.elapsed().as_secs_f64()
            );
            self.next_pct = (pct / Self::STEP_PCT + 1) * Self::STEP_PCT;
        }
    }
}

/// Tags every sentence in order.
pub fn tag_all<T: Tagger>(tagger: &T, sentences: &[Vec<String>]) -> Result<(Vec<TaggedSentence>, DecodeStats)> {
    let mut stats = DecodeStats::default();
    let mut progress = Progress::new(sentences.len());
    let mut tagged = Vec::with_capacity(sentences.len());
    for words in sentences {
        let decoded = tagger.tag(words)?;
        stats.words += words.len();
        stats.unknown += decoded.unknown_count;
        stats.guessed += decoded.guess_count;
        tagged.push(decoded.tagged);
        progress.tick();
    }
    log::info!(
        "unseen words: {} ({:.2}% of total), guessed: {} ({:.2}% of unseen)",
        stats.unknown,
        pct(stats.unknown, stats.words),
        stats.guessed,
        pct(stats.guessed, stats.unknown)
    );
    Ok((tagged, stats))
}

/// Compares decoded sentences against the gold standard word by word.
///
/// Any difference in length or in the words themselves is an alignment error.
pub fn compare(
    decoded: Vec<TaggedSentence>,
    gold: &[TaggedSentence],
    evaluation: &mut Evaluation,
    mistakes: &mut Vec<Mistake>,
) -> Result<()> {
    if decoded.len() != gold.len() {
        return Err(Error::alignment(
            decoded.len().min(gold.len()),
            0,
            format!("{} decoded sentences for {} gold sentences", decoded.len(), gold.len()),
        ));
    }
    for (i, (hyp, reference)) in decoded.into_iter().zip(gold).enumerate() {
        if hyp.len() != reference.len() {
            return Err(Error::alignment(
                i,
                hyp.len().min(reference.len()),
                format!("{} decoded words for {} gold words", hyp.len(), reference.len()),
            ));
        }
        if let Some(j) = (0..hyp.len()).find(|&j| hyp.words[j] != reference.words[j]) {
            return Err(Error::alignment(
                i,
                j,
                format!("decoded {:?} for gold {:?}", hyp.words[j], reference.words[j]),
            ));
        }
        evaluation.accumulate(&reference.tags, &hyp.tags);

        let wrong: Vec<usize> = (0..hyp.len()).filter(|&j| hyp.tags[j] != reference.tags[j]).collect();
        if wrong.is_empty() {
            continue;
        }
        let decoded_context = Rc::new(hyp);
        let gold_context = Rc::new(reference.clone());
        for j in wrong {
            mistakes.push(Mistake {
                decoded: (decoded_context.words[j].clone(), decoded_context.tags[j]),
                gold: (gold_context.words[j].clone(), gold_context.tags[j]),
                decoded_context: Rc::clone(&decoded_context),
                gold_context: Rc::clone(&gold_context),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldReport {
    pub fold: usize,
    pub train_start_pct: u32,
    pub train_pct: u32,
    pub test_start_pct: u32,
    pub test_pct: u32,
    pub train_sentences: usize,
    pub test_sentences: usize,
    pub right: usize,
    pub wrong: usize,
    pub total: usize,
    pub stats: DecodeStats,
    pub elapsed_secs: f64,
}

/// Percent windows of one fold: `(train_start, train_pct, test_start, test_pct)`.
pub fn fold_windows(fold: u32, folds: u32) -> (u32, u32, u32, u32) {
    let step = 100 / folds;
    let train_start = fold * step;
    let train_pct = 100 - step;
    let test_start = (train_start + train_pct) % 100;
    (train_start, train_pct, test_start, step)
}

/// Trains on one window of the corpus and tags the complementary one.
pub fn run_fold(
    sentences: &[TaggedSentence],
    tags: &TagSet,
    guesser: &Guesser,
    config: &HarnessConfig,
    fold: u32,
    evaluation: &mut Evaluation,
    mistakes: &mut Vec<Mistake>,
) -> Result<FoldReport> {
    let begin = Instant::now();
    let (train_start, train_pct, test_start, test_pct) = fold_windows(fold, config.folds);

    let training = dataset::slice(sentences, train_pct, train_start)?;
    log::info!("training sentences: {train_pct}% starting at {train_start}%");
    let model = Model::train(tags.clone(), &training);

    let gold = dataset::slice(sentences, test_pct, test_start)?;
    log::info!("testing sentences: {test_pct}% starting at {test_start}%");
    let tagger = BigramTagger::new(&model, guesser.clone(), config.decoder);
    let (decoded, stats) = tag_all(&tagger, &dataset::untagged(&gold))?;

    let mut fold_eval = Evaluation::default();
    compare(decoded, &gold, &mut fold_eval, mistakes)?;
    evaluation.merge(&fold_eval);

    let report = FoldReport {
        fold: fold as usize + 1,
        train_start_pct: train_start,
        train_pct,
        test_start_pct: test_start,
        test_pct,
        train_sentences: training.len(),
        test_sentences: gold.len(),
        right: fold_eval.item_total_correct,
        wrong: fold_eval.wrong(),
        total: fold_eval.item_total_num,
        stats,
        elapsed_secs: begin.elapsed().as_secs_f64(),
    };
    log::info!("total words: {}", report.total);
    log::info!("correct tags: {} ({:.2}%)", report.right, pct(report.right, report.total));
    log::info!("incorrect tags: {} ({:.2}%)", report.wrong, pct(report.wrong, report.total));
    Ok(report)
}

/// Results of a whole cross-validation run.
#[derive(Debug)]
pub struct CrossValidation {
    pub folds: Vec<FoldReport>,
    pub evaluation: Evaluation,
    pub estimation: Estimation,
    pub mistakes: Vec<Mistake>,
    pub elapsed: Duration,
}

impl CrossValidation {
    pub fn right(&self) -> usize {
        self.evaluation.item_total_correct
    }

    pub fn wrong(&self) -> usize {
        self.evaluation.wrong()
    }

    pub fn total(&self) -> usize {
        self.evaluation.item_total_num
    }

    pub fn stats(&self) -> DecodeStats {
        let mut stats = DecodeStats::default();
        for fold in &self.folds {
            stats.merge(&fold.stats);
        }
        stats
    }
}

/// Repeated train/test partitioning over the corpus, one fold per window position.
pub fn cross_validate(corpus: &Corpus, config: &HarnessConfig, lexicon: Lexicon) -> Result<CrossValidation> {
    if corpus.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    if !(2..=100).contains(&config.folds) {
        return Err(Error::invalid_argument(
            "folds",
            format!("{} is not within 2..=100", config.folds),
        ));
    }
    let begin = Instant::now();
    let tags = TagSet::from_sentences(&corpus.sentences);
    let guesser = Guesser::new(lexicon);
    let mut evaluation = Evaluation::default();
    let mut mistakes = Vec::new();
    let mut folds = Vec::with_capacity(config.folds as usize);
    for fold in 0..config.folds {
        log::info!("starting test cycle {}/{}", fold + 1, config.folds);
        folds.push(run_fold(
            &corpus.sentences,
            &tags,
            &guesser,
            config,
            fold,
            &mut evaluation,
            &mut mistakes,
        )?);
    }
    let estimation = evaluation.evaluate();
    Ok(CrossValidation {
        folds,
        evaluation,
        estimation,
        mistakes,
        elapsed: begin.elapsed(),
    })
}

/// Gold tag -> decoded tag -> number of mistakes.
pub fn confusion(mistakes: &[Mistake]) -> BTreeMap<Tag, BTreeMap<Tag, usize>> {
    let mut table: BTreeMap<Tag, BTreeMap<Tag, usize>> = BTreeMap::new();
    for m in mistakes {
        *table.entry(m.gold.1).or_default().entry(m.decoded.1).or_default() += 1;
    }
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MistakeType {
    pub count: usize,
    pub decoded: Tag,
    pub gold: Tag,
}

/// Mistake types occurring more than `threshold` times, most frequent first.
pub fn frequent_mistakes(mistakes: &[Mistake], threshold: usize) -> Vec<MistakeType> {
    let mut v: Vec<MistakeType> = confusion(mistakes)
        .into_iter()
        .flat_map(|(gold, row)| {
            row.into_iter()
                .map(move |(decoded, count)| MistakeType { count, decoded, gold })
        })
        .filter(|m| m.count > threshold)
        .collect();
    v.sort_by(|a, b| b.count.cmp(&a.count));
    v
}

/// Up to `max` mistakes, in corpus order, belonging to one of the `types`.
pub fn examples<'a>(mistakes: &'a [Mistake], types: &[MistakeType], max: usize) -> Vec<&'a Mistake> {
    mistakes
        .iter()
        .filter(|m| types.iter().any(|t| t.decoded == m.decoded.1 && t.gold == m.gold.1))
        .take(max)
        .collect()
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub folds: &'a [FoldReport],
    pub right: usize,
    pub wrong: usize,
    pub total: usize,
    pub elapsed_secs: f64,
    pub stats: DecodeStats,
    pub estimation: Estimation,
    pub evaluation: &'a Evaluation,
    pub frequent_mistakes: Vec<MistakeType>,
}

impl<'a> Summary<'a> {
    pub fn new(cv: &'a CrossValidation, config: &HarnessConfig) -> Self {
        Self {
            folds: &cv.folds,
            right: cv.right(),
            wrong: cv.wrong(),
            total: cv.total(),
            elapsed_secs: cv.elapsed.as_secs_f64(),
            stats: cv.stats(),
            estimation: cv.estimation,
            evaluation: &cv.evaluation,
            frequent_mistakes: frequent_mistakes(&cv.mistakes, config.mistake_threshold),
        }
    }
}

const SEP_BIG: &str = "---------------------------------------------------";
const SEP_SMALL: &str = "-----------------------------------------";

/// Writes the textual report: totals, confusion table, frequent mistakes and examples.
pub fn write_report<W: Write>(w: &mut W, cv: &CrossValidation, config: &HarnessConfig) -> Result<()> {
    writeln!(w, "Total tests run: {}", cv.folds.len())?;
    writeln!(w, "Total time taken: {:.2} seconds", cv.elapsed.as_secs_f64())?;
    writeln!(w, "Average correct tags: {:.2}%", pct(cv.right(), cv.total()))?;
    writeln!(w, "Average incorrect tags: {:.2}%", pct(cv.wrong(), cv.total()))?;
    let stats = cv.stats();
    writeln!(
        w,
        "Unseen words: {} ({:.2}% of total), guessed: {} ({:.2}% of unseen)",
        stats.unknown,
        pct(stats.unknown, stats.words),
        stats.guessed,
        pct(stats.guessed, stats.unknown)
    )?;
    writeln!(w)?;
    write!(w, "{}", cv.evaluation)?;
    writeln!(w)?;

    let table = confusion(&cv.mistakes);
    if !table.is_empty() {
        writeln!(w, "Mistakes (gold tag => decoded tag: count):")?;
        for (gold, row) in &table {
            let cells: Vec<String> = row.iter().map(|(t, c)| format!("{t}: {c}")).collect();
            writeln!(w, "\t{gold} => {}", cells.join(", "))?;
        }
        writeln!(w)?;
    }

    let frequent = frequent_mistakes(&cv.mistakes, config.mistake_threshold);
    for m in &frequent {
        writeln!(w, "{}\t{}\twas really\t{}", m.count, m.decoded, m.gold)?;
    }
    for m in examples(&cv.mistakes, &frequent, config.max_examples) {
        writeln!(w, "{SEP_BIG}")?;
        writeln!(
            w,
            "Tagged '{}' with {} when it should have been {}.",
            m.decoded.0, m.decoded.1, m.gold.1
        )?;
        writeln!(w, "{SEP_SMALL}")?;
        writeln!(w, "Gold: {}", m.gold_context)?;
        writeln!(w, "{SEP_SMALL}")?;
        writeln!(w, "Mine: {}", m.decoded_context)?;
    }
    Ok(())
}
