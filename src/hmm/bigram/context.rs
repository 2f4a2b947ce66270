/// Score lattice of a single sentence.
///
/// Created for one decoding call, filled column by column and consumed by the backtrace.
#[derive(Debug)]
pub(crate) struct Lattice {
    /// The total number of tags (L).
    pub num_labels: usize,
    /// The number of items (T) of the sentence.
    num_items: usize,
    /// This is a [T][L] matrix whose element [t][l] is the score of the best path
    /// arriving at (t, l).
    score: Vec<f64>,
    /// This is a [T][L] matrix whose element [t][j] is the tag #i of position t-1 the
    /// path to (t, j) comes from. `None` at position 0.
    backward_edge: Vec<Option<usize>>,
    /// Whether the scores of position t were replaced by a guessed distribution.
    guessed: Vec<bool>,
}

impl Lattice {
    pub fn new(num_labels: usize, num_items: usize) -> Self {
        Self {
            num_labels,
            num_items,
            score: vec![0.0; num_labels * num_items],
            backward_edge: vec![None; num_labels * num_items],
            guessed: vec![false; num_items],
        }
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    #[inline]
    pub fn score(&self, t: usize, l: usize) -> f64 {
        self.score[self.num_labels * t + l]
    }

    #[inline]
    pub fn set(&mut self, t: usize, l: usize, score: f64, edge: Option<usize>) {
        let idx = self.num_labels * t + l;
        self.score[idx] = score;
        self.backward_edge[idx] = edge;
    }

    pub fn column(&self, t: usize) -> &[f64] {
        let offset = self.num_labels * t;
        &self.score[offset..offset + self.num_labels]
    }

    pub fn is_zero(&self, t: usize) -> bool {
        self.column(t).iter().all(|&s| s == 0.0)
    }

    pub fn guessed(&self) -> &[bool] {
        &self.guessed
    }

    /// Replaces an all-zero column with a distribution: 0.75 on the guessed row and
    /// the rest split over the other rows, or a uniform distribution without a guess.
    pub fn smooth(&mut self, t: usize, guess: Option<usize>) {
        let L = self.num_labels;
        let offset = L * t;
        let column = &mut self.score[offset..offset + L];
        match guess {
            Some(g) => {
                const GUESS_WEIGHT: f64 = 0.75;
                let rest = if L > 1 { (1.0 - GUESS_WEIGHT) / (L - 1) as f64 } else { 0.0 };
                for (i, s) in column.iter_mut().enumerate() {
                    *s = if i == g { GUESS_WEIGHT } else { rest };
                }
                self.guessed[t] = true;
            }
            None => column.iter_mut().for_each(|s| *s = 1.0 / L as f64),
        }
    }

    /// Indices of the tags achieving the maximum score at position t, in ascending order.
    pub fn frontier(&self, t: usize) -> Vec<usize> {
        let column = self.column(t);
        let max = column.iter().copied().fold(f64::MIN, f64::max);
        column
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == max)
            .map(|(i, _)| i)
            .collect()
    }

    /// Follows the backward edges from the first best tag of the last position.
    pub fn backtrace(&self) -> Vec<usize> {
        let T = self.num_items;
        let mut labels = vec![0; T];
        if T == 0 {
            return labels;
        }
        let mut max_score = f64::MIN;
        for (i, &s) in self.column(T - 1).iter().enumerate() {
            if max_score < s {
                max_score = s;
                labels[T - 1] = i;
            }
        }
        for t in (0..T - 1).rev() {
            let j = labels[t + 1];
            labels[t] = self.backward_edge[self.num_labels * (t + 1) + j].unwrap_or_default();
        }
        labels
    }
}
