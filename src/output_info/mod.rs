//! Per-iteration metric instrumentation (§4.8): maintains the posterior
//! table `g` and margin table `m` for a registered dataset and emits one
//! separator-delimited line per active metric, every boosting iteration.
use crate::data::{Dataset, InputData, Sign};
use crate::weak_learner::Hypothesis;

/// The three-letter metric codes from §4.8. Each derives `Serialize` so a
/// config file can list the active set (§3.1, "every public config struct").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OutputMetric {
    /// zero-one error (winner-takes-all)
    E01,
    /// weighted zero-one error, weighted by initial per-label weight
    W01,
    /// Hamming loss
    Ham,
    /// weighted Hamming loss
    Wha,
    /// restricted zero-one error (min positive margin > max negative margin)
    R01,
    /// weighted error (weighted Hamming against live weight, not w0)
    Wer,
    /// balanced error rate
    Ber,
    /// mean absolute error of the posterior against {-1,+1}
    Mae,
    /// mean margin
    Mar,
    /// edge of the current iteration's weak hypothesis
    Edg,
    /// approximate per-class AUC, averaged
    Auc,
    /// true positive rate / false positive rate pair
    Tfr,
    /// cascade forecast vector + rejection threshold history
    Sca,
    /// raw posteriors dump
    Pos,
}

impl OutputMetric {
    pub fn code(self) -> &'static str {
        match self {
            OutputMetric::E01 => "e01",
            OutputMetric::W01 => "w01",
            OutputMetric::Ham => "ham",
            OutputMetric::Wha => "wha",
            OutputMetric::R01 => "r01",
            OutputMetric::Wer => "wer",
            OutputMetric::Ber => "ber",
            OutputMetric::Mae => "mae",
            OutputMetric::Mar => "mar",
            OutputMetric::Edg => "edg",
            OutputMetric::Auc => "auc",
            OutputMetric::Tfr => "tfr",
            OutputMetric::Sca => "sca",
            OutputMetric::Pos => "pos",
        }
    }
}

/// `g[i][l]`: accumulated score; `m[i][l] = g[i][l] * y[i][l]`. Owned
/// per-dataset, updated incrementally (§3, "Posterior table").
pub struct OutputTables {
    n_examples: usize,
    n_classes: usize,
    g: Vec<f64>,
    sum_alpha: f64,
    /// cascade-only: per-example running score and whether it has been
    /// rejected by an earlier stage (§4.8, "sca").
    rejected: Vec<bool>,
    threshold_history: Vec<f64>,
}

impl OutputTables {
    pub fn new(n_examples: usize, n_classes: usize) -> Self {
        Self {
            n_examples,
            n_classes,
            g: vec![0.0; n_examples * n_classes],
            sum_alpha: 0.0,
            rejected: vec![false; n_examples],
            threshold_history: Vec::new(),
        }
    }

    #[inline]
    fn idx(&self, i: usize, l: usize) -> usize {
        i * self.n_classes + l
    }

    pub fn g(&self, i: usize, l: usize) -> f64 {
        self.g[self.idx(i, l)]
    }

    pub fn margin(&self, data: &Dataset, i: usize, l: usize) -> f64 {
        let ex = data.example(i);
        let y = ex.label(l).map(|label| label.y()).unwrap_or(0.0);
        self.g(i, l) * y
    }

    /// Folds one newly trained hypothesis into `g`, and (for cascades)
    /// marks examples whose running score drops below `reject_threshold`.
    pub fn update(&mut self, data: &Dataset, hyp: &Hypothesis) {
        self.sum_alpha += hyp.alpha;
        for i in 0..self.n_examples {
            let ex = data.example(i);
            for l in 0..self.n_classes {
                let contribution = hyp.confidence(ex, l);
                let idx = self.idx(i, l);
                self.g[idx] += contribution;
            }
        }
        if let Some(t) = hyp.reject_threshold {
            self.threshold_history.push(t);
            for i in 0..self.n_examples {
                let score: f64 = (0..self.n_classes).map(|l| self.g(i, l)).sum();
                if score < t {
                    self.rejected[i] = true;
                }
            }
        }
    }

    pub fn sum_alpha(&self) -> f64 {
        self.sum_alpha
    }
}

/// Drives `OutputTables` and formats the active metrics into one line per
/// iteration, mirroring the teacher's console-progress `Logger` (§4.8).
pub struct OutputInfo {
    metrics: Vec<OutputMetric>,
    tables: OutputTables,
    separator: char,
}

impl OutputInfo {
    pub fn new(metrics: Vec<OutputMetric>, n_examples: usize, n_classes: usize) -> Self {
        Self { metrics, tables: OutputTables::new(n_examples, n_classes), separator: '\t' }
    }

    pub fn header(&self) -> String {
        self.metrics.iter().map(|m| m.code()).collect::<Vec<_>>().join(&self.separator.to_string())
    }

    /// Folds the new hypothesis into the posterior/margin tables, formats
    /// the active metrics into one line, and emits it via `log::info!`
    /// (§4.8: "through the log facade... mirroring the teacher's
    /// Logger::run console progress print").
    pub fn emit(&mut self, data: &Dataset, view: &InputData, iter: usize, hyp: &Hypothesis) -> String {
        self.tables.update(data, hyp);

        let fields: Vec<String> = self.metrics.iter()
            .map(|&m| self.format_metric(m, data, view, hyp))
            .collect();
        let line = fields.join(&self.separator.to_string());
        log::info!("[ ROUND {iter} ] {line}");
        line
    }

    fn format_metric(&self, metric: OutputMetric, data: &Dataset, view: &InputData, hyp: &Hypothesis) -> String {
        match metric {
            OutputMetric::E01 => format!("{:.6}", self.zero_one_error(data, view, false)),
            OutputMetric::W01 => format!("{:.6}", self.zero_one_error(data, view, true)),
            OutputMetric::Ham => format!("{:.6}", self.hamming_loss(data, view, false)),
            OutputMetric::Wha => format!("{:.6}", self.hamming_loss(data, view, true)),
            OutputMetric::R01 => format!("{:.6}", self.restricted_zero_one(data, view)),
            OutputMetric::Wer => format!("{:.6}", self.live_weighted_hamming_loss(data, view)),
            OutputMetric::Ber => format!("{:.6}", self.balanced_error(data, view)),
            OutputMetric::Mae => format!("{:.6}", self.mean_absolute_error(data, view)),
            OutputMetric::Mar => format!("{:.6}", self.mean_margin(data, view)),
            OutputMetric::Edg => format!("{:.6}", hyp.edge(data, view, true)),
            OutputMetric::Auc => format!("{:.6}", self.mean_auc(data, view)),
            OutputMetric::Tfr => {
                let (tpr, fpr) = self.tpr_fpr(data, view);
                format!("{tpr:.6}/{fpr:.6}")
            }
            OutputMetric::Sca => {
                let rejected = self.tables.rejected.iter().filter(|&&r| r).count();
                format!("{rejected}/{}", self.tables.n_examples)
            }
            OutputMetric::Pos => {
                (0..data.n_classes())
                    .map(|l| format!("{:.4}", self.tables.g(0, l)))
                    .collect::<Vec<_>>()
                    .join(",")
            }
        }
    }

    fn zero_one_error(&self, data: &Dataset, view: &InputData, weighted: bool) -> f64 {
        let n_classes = data.n_classes();
        let mut wrong = 0.0;
        let mut total = 0.0;
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            let predicted = (0..n_classes)
                .max_by(|&a, &b| self.tables.g(raw, a).partial_cmp(&self.tables.g(raw, b)).unwrap())
                .unwrap_or(0);
            let weight = if weighted {
                ex.label(predicted).map(|l| l.initial_weight).unwrap_or(1.0)
            } else {
                1.0
            };
            total += weight;
            let is_true = ex.label(predicted).map(|l| l.y == Sign::Pos).unwrap_or(false);
            if !is_true {
                wrong += weight;
            }
        }
        if total > 0.0 { wrong / total } else { 0.0 }
    }

    fn hamming_loss(&self, data: &Dataset, view: &InputData, weighted: bool) -> f64 {
        let mut wrong = 0.0;
        let mut total = 0.0;
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                let weight = if weighted { label.initial_weight } else { 1.0 };
                total += weight;
                let g = self.tables.g(raw, label.class_idx);
                let predicted = Sign::from_f64(g).as_f64();
                if predicted != label.y() {
                    wrong += weight;
                }
            }
        }
        let _ = data;
        if total > 0.0 { wrong / total } else { 0.0 }
    }

    /// Hamming loss weighted by each label's current (post-update) weight
    /// rather than its initial weight, distinguishing `wer` from `wha`
    /// (§4.8: "weighted Hamming against live weight, not w0").
    fn live_weighted_hamming_loss(&self, data: &Dataset, view: &InputData) -> f64 {
        let mut wrong = 0.0;
        let mut total = 0.0;
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                total += label.weight;
                let g = self.tables.g(raw, label.class_idx);
                let predicted = Sign::from_f64(g).as_f64();
                if predicted != label.y() {
                    wrong += label.weight;
                }
            }
        }
        let _ = data;
        if total > 0.0 { wrong / total } else { 0.0 }
    }

    fn restricted_zero_one(&self, data: &Dataset, view: &InputData) -> f64 {
        let n_classes = data.n_classes();
        let mut wrong = 0.0;
        let mut total = 0.0;
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            total += 1.0;
            let min_pos = (0..n_classes)
                .filter(|&l| ex.label(l).map(|lb| lb.y == Sign::Pos).unwrap_or(false))
                .map(|l| self.tables.g(raw, l))
                .fold(f64::INFINITY, f64::min);
            let max_neg = (0..n_classes)
                .filter(|&l| ex.label(l).map(|lb| lb.y == Sign::Neg).unwrap_or(false))
                .map(|l| self.tables.g(raw, l))
                .fold(f64::NEG_INFINITY, f64::max);
            if !(min_pos > max_neg) {
                wrong += 1.0;
            }
        }
        if total > 0.0 { wrong / total } else { 0.0 }
    }

    fn balanced_error(&self, data: &Dataset, view: &InputData) -> f64 {
        let n_classes = data.n_classes();
        let mut per_class_wrong = vec![0.0; n_classes];
        let mut per_class_total = vec![0.0; n_classes];
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                per_class_total[label.class_idx] += 1.0;
                let predicted = Sign::from_f64(self.tables.g(raw, label.class_idx)).as_f64();
                if predicted != label.y() {
                    per_class_wrong[label.class_idx] += 1.0;
                }
            }
        }
        let rates: Vec<f64> = (0..n_classes)
            .filter(|&l| per_class_total[l] > 0.0)
            .map(|l| per_class_wrong[l] / per_class_total[l])
            .collect();
        if rates.is_empty() { 0.0 } else { rates.iter().sum::<f64>() / rates.len() as f64 }
    }

    fn mean_absolute_error(&self, data: &Dataset, view: &InputData) -> f64 {
        let mut sum = 0.0;
        let mut count = 0.0;
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                sum += (self.tables.g(raw, label.class_idx) - label.y()).abs();
                count += 1.0;
            }
        }
        let _ = data;
        if count > 0.0 { sum / count } else { 0.0 }
    }

    fn mean_margin(&self, data: &Dataset, view: &InputData) -> f64 {
        let mut sum = 0.0;
        let mut count = 0.0;
        for (logical, _) in view.iter() {
            let raw = view.raw_index(logical);
            for l in 0..data.n_classes() {
                sum += self.tables.margin(data, raw, l);
                count += 1.0;
            }
        }
        if count > 0.0 { sum / count } else { 0.0 }
    }

    /// Per-class AUC via pairwise rank comparisons between positive and
    /// negative labeled examples, averaged across classes with both.
    fn mean_auc(&self, data: &Dataset, view: &InputData) -> f64 {
        let n_classes = data.n_classes();
        let mut aucs = Vec::new();
        for l in 0..n_classes {
            let mut pos_scores = Vec::new();
            let mut neg_scores = Vec::new();
            for (logical, ex) in view.iter() {
                let raw = view.raw_index(logical);
                match ex.label(l).map(|lb| lb.y) {
                    Some(Sign::Pos) => pos_scores.push(self.tables.g(raw, l)),
                    Some(Sign::Neg) => neg_scores.push(self.tables.g(raw, l)),
                    _ => {}
                }
            }
            if pos_scores.is_empty() || neg_scores.is_empty() {
                continue;
            }
            let mut concordant = 0.0;
            for &p in &pos_scores {
                for &n in &neg_scores {
                    if p > n {
                        concordant += 1.0;
                    } else if p == n {
                        concordant += 0.5;
                    }
                }
            }
            aucs.push(concordant / (pos_scores.len() as f64 * neg_scores.len() as f64));
        }
        if aucs.is_empty() { 0.5 } else { aucs.iter().sum::<f64>() / aucs.len() as f64 }
    }

    fn tpr_fpr(&self, data: &Dataset, view: &InputData) -> (f64, f64) {
        let n_classes = data.n_classes();
        let (mut tp, mut fn_, mut fp, mut tn) = (0.0, 0.0, 0.0, 0.0);
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            for l in 0..n_classes {
                let Some(label) = ex.label(l) else { continue };
                if label.y == Sign::Abstain {
                    continue;
                }
                let predicted_pos = self.tables.g(raw, l) > 0.0;
                match (label.y == Sign::Pos, predicted_pos) {
                    (true, true) => tp += 1.0,
                    (true, false) => fn_ += 1.0,
                    (false, true) => fp += 1.0,
                    (false, false) => tn += 1.0,
                }
            }
        }
        let tpr = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let fpr = if fp + tn > 0.0 { fp / (fp + tn) } else { 0.0 };
        (tpr, fpr)
    }
}
