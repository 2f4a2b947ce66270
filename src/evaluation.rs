use std::{collections::BTreeMap, fmt::Display, iter::zip};

use serde::Serialize;

use crate::hmm::tag::Tag;

/// Tag-wise performance values.
#[derive(Debug, Default, Clone, Serialize)]
pub struct LabelMeasure {
    /// Number of correct predictions.
    pub num_correct: usize,
    /// Number of occurrences of the tag in the gold-standard data.
    pub num_observation: usize,
    /// Number of predictions.
    pub num_prediction: usize,
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

/// Summary returned by [`Evaluation::evaluate`].
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Estimation {
    pub item_accuracy: f64,
    pub inst_accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_fmeasure: f64,
}

/// Overall performance values over a stream of tagged sentences.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Evaluation {
    tbl: BTreeMap<Tag, LabelMeasure>,

    /// Number of correctly predicted items.
    pub item_total_correct: usize,
    /// Total number of items.
    pub item_total_num: usize,
    /// Number of sentences predicted without a mistake.
    pub inst_total_correct: usize,
    /// Total number of sentences.
    pub inst_total_num: usize,

    estimation: Estimation,
}

impl Evaluation {
    /// Adds one sentence worth of gold and predicted tags.
    ///
    /// # Panics
    ///
    /// Panics if `reference` and `prediction` differ in length; callers check the alignment
    /// first, as [`crate::harness::compare`] does.
    pub fn accumulate(&mut self, reference: &[Tag], prediction: &[Tag]) {
        assert_eq!(reference.len(), prediction.len(), "unaligned sentence");
        let mut matched = 0;
        for (&r, &p) in zip(reference, prediction) {
            self.tbl.entry(r).or_default().num_observation += 1;
            self.tbl.entry(p).or_default().num_prediction += 1;
            if r == p {
                self.tbl.entry(r).or_default().num_correct += 1;
                matched += 1;
            }
        }
        self.item_total_num += reference.len();
        self.item_total_correct += matched;
        if matched == prediction.len() {
            self.inst_total_correct += 1;
        }
        self.inst_total_num += 1;
    }

    /// Merges the counts of another evaluation, e.g. of another fold.
    pub fn merge(&mut self, other: &Evaluation) {
        for (&tag, lev) in &other.tbl {
            let e = self.tbl.entry(tag).or_default();
            e.num_correct += lev.num_correct;
            e.num_observation += lev.num_observation;
            e.num_prediction += lev.num_prediction;
        }
        self.item_total_correct += other.item_total_correct;
        self.item_total_num += other.item_total_num;
        self.inst_total_correct += other.inst_total_correct;
        self.inst_total_num += other.inst_total_num;
    }

    pub fn wrong(&self) -> usize {
        self.item_total_num - self.item_total_correct
    }

    pub fn label(&self, tag: Tag) -> Option<&LabelMeasure> {
        self.tbl.get(&tag)
    }

    pub fn evaluate(&mut self) -> Estimation {
        let mut est = Estimation::default();
        let mut num_labels = 0;
        for lev in self.tbl.values_mut() {
            if lev.num_observation == 0 {
                continue;
            }
            num_labels += 1;
            lev.precision = 0.0;
            lev.recall = 0.0;
            lev.fmeasure = 0.0;

            if lev.num_prediction > 0 {
                lev.precision = lev.num_correct as f64 / lev.num_prediction as f64;
            }
            lev.recall = lev.num_correct as f64 / lev.num_observation as f64;
            if lev.precision + lev.recall > 0.0 {
                lev.fmeasure = lev.precision * lev.recall * 2.0 / (lev.precision + lev.recall);
            }
            est.macro_precision += lev.precision;
            est.macro_recall += lev.recall;
            est.macro_fmeasure += lev.fmeasure;
        }
        if num_labels > 0 {
            est.macro_precision /= num_labels as f64;
            est.macro_recall /= num_labels as f64;
            est.macro_fmeasure /= num_labels as f64;
        }
        if self.item_total_num > 0 {
            est.item_accuracy = self.item_total_correct as f64 / self.item_total_num as f64;
        }
        if self.inst_total_num > 0 {
            est.inst_accuracy = self.inst_total_correct as f64 / self.inst_total_num as f64;
        }
        self.estimation = est;
        est
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by tag (#match, #model, #ref) (precision, recall, F1):")?;
        for (tag, lev) in &self.tbl {
            if lev.num_observation == 0 {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) (******, ******, ******)",
                    tag, lev.num_correct, lev.num_prediction, lev.num_observation
                )?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    tag,
                    lev.num_correct,
                    lev.num_prediction,
                    lev.num_observation,
                    lev.precision,
                    lev.recall,
                    lev.fmeasure
                )?;
            }
        }
        let est = &self.estimation;
        writeln!(
            f,
            "Macro-average precision, recall, F1: ({:.4}, {:.4}, {:.4})",
            est.macro_precision, est.macro_recall, est.macro_fmeasure
        )?;
        writeln!(
            f,
            "Item accuracy: {}/{} => {:.4}",
            self.item_total_correct, self.item_total_num, est.item_accuracy
        )?;
        writeln!(
            f,
            "Sentence accuracy: {}/{} => {:.4}",
            self.inst_total_correct, self.inst_total_num, est.inst_accuracy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Tag::*;

    #[test]
    fn accumulate_and_evaluate() {
        let mut e = Evaluation::default();
        e.accumulate(&[Determiner, Noun, Terminal], &[Determiner, Noun, Terminal]);
        e.accumulate(&[Determiner, Noun, Verb], &[Determiner, Adjective, Verb]);
        let est = e.evaluate();
        assert_eq!(6, e.item_total_num);
        assert_eq!(5, e.item_total_correct);
        assert_eq!(1, e.wrong());
        assert_eq!(1, e.inst_total_correct);
        assert!((est.item_accuracy - 5.0 / 6.0).abs() < 1e-12);
        assert!((est.inst_accuracy - 0.5).abs() < 1e-12);

        let nn = e.label(Noun).unwrap();
        assert_eq!((1, 2, 1), (nn.num_correct, nn.num_observation, nn.num_prediction));
        assert!((nn.recall - 0.5).abs() < 1e-12);
        assert!((nn.precision - 1.0).abs() < 1e-12);
        // JJ was predicted but never observed
        assert_eq!(0, e.label(Adjective).unwrap().num_observation);
        assert!(e.to_string().contains("JJ: (0, 1, 0) (******, ******, ******)"));
    }

    #[test]
    #[should_panic(expected = "unaligned sentence")]
    fn unaligned_sentence_panics() {
        Evaluation::default().accumulate(&[Noun, Verb], &[Noun]);
    }

    #[test]
    fn merge_folds() {
        let mut a = Evaluation::default();
        a.accumulate(&[Noun], &[Noun]);
        let mut b = Evaluation::default();
        b.accumulate(&[Noun, Verb], &[Verb, Verb]);
        a.merge(&b);
        let est = a.evaluate();
        assert_eq!(3, a.item_total_num);
        assert_eq!(2, a.item_total_correct);
        assert_eq!(2, a.inst_total_num);
        assert!((est.inst_accuracy - 0.5).abs() < 1e-12);
    }
}
