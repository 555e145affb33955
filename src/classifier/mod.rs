//! Replays a serialized ensemble over a dataset (§4.9): winner-takes-all
//! or restricted 0-1 prediction, cascade short-circuit rejection, and
//! confusion-matrix / ROC / posterior output.
use crate::data::{Dataset, InputData, Sign};
use crate::serialization::StageMarker;
use crate::weak_learner::Hypothesis;

/// How `Classifier::predict` maps a posterior row to a class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PredictionRule {
    /// `argmax_l g[i][l]`.
    WinnerTakesAll,
    /// `min_{l+} g - max_{l-} g > 0`.
    Restricted01,
}

/// A single example's classification outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Predicted(usize),
    /// Rejected at cascade stage `stage_idx` before reaching a final score.
    Rejected { stage_idx: usize },
}

/// A trained model: the ensemble plus (for VJ-cascades) the stage
/// boundaries that partition it.
pub struct Classifier {
    ensemble: Vec<Hypothesis>,
    stages: Vec<StageMarker>,
    rule: PredictionRule,
}

impl Classifier {
    pub fn new(ensemble: Vec<Hypothesis>, stages: Vec<StageMarker>, rule: PredictionRule) -> Self {
        Self { ensemble, stages, rule }
    }

    pub fn is_cascade(&self) -> bool {
        !self.stages.is_empty()
    }

    /// Builds the posterior row `g[i][*]` for one example, short-circuiting
    /// at the first cascade stage whose running score drops below its
    /// threshold.
    pub fn posterior(&self, data: &Dataset, raw_idx: usize) -> Outcome {
        let ex = data.example(raw_idx);
        let n_classes = data.n_classes();
        let mut g = vec![0.0; n_classes];

        let mut stage_iter = self.stages.iter().peekable();
        for (i, hyp) in self.ensemble.iter().enumerate() {
            for l in 0..n_classes {
                g[l] += hyp.confidence(ex, l);
            }
            while let Some(marker) = stage_iter.peek() {
                if marker.idx == i {
                    let score: f64 = g.iter().sum();
                    if score < marker.threshold {
                        return Outcome::Rejected { stage_idx: marker.idx };
                    }
                    stage_iter.next();
                } else {
                    break;
                }
            }
        }

        let predicted = match self.rule {
            PredictionRule::WinnerTakesAll => (0..n_classes)
                .max_by(|&a, &b| g[a].partial_cmp(&g[b]).unwrap())
                .unwrap_or(0),
            PredictionRule::Restricted01 => {
                let min_pos = (0..n_classes)
                    .filter(|&l| ex.label(l).map(|lb| lb.y == Sign::Pos).unwrap_or(false))
                    .map(|l| g[l])
                    .fold(f64::INFINITY, f64::min);
                let max_neg = (0..n_classes)
                    .filter(|&l| ex.label(l).map(|lb| lb.y == Sign::Neg).unwrap_or(false))
                    .map(|l| g[l])
                    .fold(f64::NEG_INFINITY, f64::max);
                if min_pos > max_neg {
                    (0..n_classes).max_by(|&a, &b| g[a].partial_cmp(&g[b]).unwrap()).unwrap_or(0)
                } else {
                    usize::MAX // sentinel: no class clears the margin
                }
            }
        };
        Outcome::Predicted(predicted)
    }

    /// Predictions for every example in `view`.
    pub fn predict_all(&self, data: &Dataset, view: &InputData) -> Vec<Outcome> {
        view.iter().map(|(logical, _)| self.posterior(data, view.raw_index(logical))).collect()
    }

    /// `confusion[true][predicted]`, counting rejected examples in a
    /// trailing "rejected" row/column (index `n_classes`).
    pub fn confusion_matrix(&self, data: &Dataset, view: &InputData) -> Vec<Vec<u64>> {
        let n = data.n_classes();
        let mut matrix = vec![vec![0u64; n + 1]; n + 1];
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            let true_class = (0..n)
                .find(|&l| ex.label(l).map(|lb| lb.y == Sign::Pos).unwrap_or(false))
                .unwrap_or(n);
            match self.posterior(data, raw) {
                Outcome::Predicted(p) => matrix[true_class][p.min(n)] += 1,
                Outcome::Rejected { .. } => matrix[true_class][n] += 1,
            }
        }
        matrix
    }

    pub fn ensemble(&self) -> &[Hypothesis] {
        &self.ensemble
    }
}
