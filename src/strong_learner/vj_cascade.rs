//! Viola-Jones cascade (§4.6): an outer loop over stages. Each stage runs
//! AdaBoost.MH-style boosting on the current training/validation subsets
//! until the stage's false-positive rate on the validation set drops below
//! `f_max`, then filters out the negatives the stage already rejects
//! before starting the next stage.
use crate::classifier::{Classifier, PredictionRule};
use crate::config::{CascadeConfig, TrainConfig};
use crate::data::{Dataset, InputData, Sign, SortedColumn};
use crate::serialization::StageMarker;
use crate::weak_learner::{ConstantLearner, Hypothesis, WeakLearner};

use super::State;

pub struct VjCascade {
    train_dataset: Dataset,
    valid_dataset: Dataset,
    sorted: Vec<Option<SortedColumn>>,
    weak_learner: Box<dyn WeakLearner>,
    config: TrainConfig,
    cascade_config: CascadeConfig,
    positive_class: usize,

    train_remaining: Vec<usize>,
    valid_remaining: Vec<usize>,
    /// Cumulative posterior score per raw validation index, matching the
    /// running sum `Classifier::posterior` recomputes at replay time.
    valid_g: Vec<f64>,

    ensemble: Vec<Hypothesis>,
    stages: Vec<StageMarker>,
    current_stage_hyps: Vec<Hypothesis>,
    current_stage_round: usize,
    stage_idx: usize,
}

impl VjCascade {
    pub fn new(
        train_dataset: Dataset,
        valid_dataset: Dataset,
        weak_learner: Box<dyn WeakLearner>,
        config: TrainConfig,
        cascade_config: CascadeConfig,
    ) -> Self {
        let positive_class = train_dataset.class_index(&cascade_config.positive_label).unwrap_or(0);
        let sorted = SortedColumn::build_all(&train_dataset);
        let train_remaining = (0..train_dataset.n_examples()).collect();
        let n_valid = valid_dataset.n_examples();

        Self {
            train_dataset,
            valid_dataset,
            sorted,
            weak_learner,
            config,
            cascade_config,
            positive_class,
            train_remaining,
            valid_remaining: (0..n_valid).collect(),
            valid_g: vec![0.0; n_valid],
            ensemble: Vec::new(),
            stages: Vec::new(),
            current_stage_hyps: Vec::new(),
            current_stage_round: 0,
            stage_idx: 0,
        }
    }

    fn train_one_on_remaining(&self) -> (Hypothesis, f64) {
        let mut view = InputData::new(&self.train_dataset);
        view.filter_to_raw_indices(self.train_remaining.clone());

        let (mut hyp, mut energy) = self.weak_learner.train(&self.train_dataset, &view, &self.sorted, self.config.edge_offset);
        if self.config.force_constant_check || energy.is_nan() {
            let constant = ConstantLearner::new();
            let (const_hyp, const_energy) = constant.train(&self.train_dataset, &view, &self.sorted, self.config.edge_offset);
            if energy.is_nan() || const_energy < energy
                || (self.config.prefer_constant_on_tie && const_energy == energy)
            {
                hyp = const_hyp;
                energy = const_energy;
            }
        }
        (hyp, energy)
    }

    fn apply_weight_update_on_remaining(&mut self, hyp: &Hypothesis) {
        let n_classes = self.train_dataset.n_classes();
        let contributions: Vec<(usize, Vec<f64>)> = self.train_remaining.iter()
            .map(|&raw| (raw, (0..n_classes).map(|l| hyp.classify(self.train_dataset.example(raw), l)).collect()))
            .collect();

        let mut z = 0.0;
        for (raw, h_vals) in &contributions {
            let ex = &mut self.train_dataset.examples_mut()[*raw];
            for label in ex.labels.iter_mut() {
                if label.y == Sign::Abstain {
                    continue;
                }
                label.weight *= (-hyp.alpha * h_vals[label.class_idx] * label.y()).exp();
                z += label.weight;
            }
        }
        if z > 0.0 {
            for &raw in &self.train_remaining {
                let ex = &mut self.train_dataset.examples_mut()[raw];
                for label in ex.labels.iter_mut() {
                    if label.y != Sign::Abstain {
                        label.weight /= z;
                    }
                }
            }
        }
    }

    /// Stage threshold (the minimum score among surviving validation
    /// positives, so TPR among survivors never drops by construction) plus
    /// the resulting TPR/FPR among `valid_remaining` (§4.6, "VJ-cascade").
    fn evaluate_stage(&self) -> (f64, f64, f64) {
        let mut pos_scores = Vec::new();
        let mut neg_scores = Vec::new();
        for &raw in &self.valid_remaining {
            let ex = self.valid_dataset.example(raw);
            match ex.label(self.positive_class).map(|l| l.y) {
                Some(Sign::Pos) => pos_scores.push(self.valid_g[raw]),
                Some(Sign::Neg) => neg_scores.push(self.valid_g[raw]),
                _ => {}
            }
        }
        let min_pos = pos_scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let threshold = if min_pos.is_finite() { min_pos } else { f64::NEG_INFINITY };

        let tpr = if pos_scores.is_empty() { 1.0 } else {
            pos_scores.iter().filter(|&&s| s >= threshold).count() as f64 / pos_scores.len() as f64
        };
        let fpr = if neg_scores.is_empty() { 0.0 } else {
            neg_scores.iter().filter(|&&s| s >= threshold).count() as f64 / neg_scores.len() as f64
        };
        (threshold, tpr, fpr)
    }

    fn close_stage(&mut self, threshold: f64) {
        let n_added = self.current_stage_hyps.len();
        if n_added == 0 {
            return;
        }
        self.ensemble.append(&mut self.current_stage_hyps);
        self.stages.push(StageMarker {
            idx: self.ensemble.len() - 1,
            n_weak_hyp: n_added,
            threshold,
        });

        let positive_class = self.positive_class;
        let train_dataset = &self.train_dataset;
        let ensemble = &self.ensemble;
        self.train_remaining.retain(|&raw| {
            let ex = train_dataset.example(raw);
            if !matches!(ex.label(positive_class).map(|l| l.y), Some(Sign::Neg)) {
                return true;
            }
            let score: f64 = ensemble.iter()
                .map(|h| h.confidence(ex, positive_class))
                .sum();
            score >= threshold
        });
        self.valid_remaining.retain(|&raw| {
            let ex = self.valid_dataset.example(raw);
            !matches!(ex.label(self.positive_class).map(|l| l.y), Some(Sign::Neg))
                || self.valid_g[raw] >= threshold
        });

        self.current_stage_round = 0;
        self.stage_idx += 1;
        log::info!(
            "[ CASCADE ] stage {} closed: threshold={threshold:.6}, train_remaining={}, valid_remaining={}",
            self.stage_idx - 1, self.train_remaining.len(), self.valid_remaining.len()
        );
    }
}

impl super::StrongLearner for VjCascade {
    fn preprocess(&mut self) {
        log::info!(
            "[ CASCADE ] starting VJ-cascade: {} train / {} valid examples, f_max={:.4}, d_min={:.4}",
            self.train_dataset.n_examples(), self.valid_dataset.n_examples(),
            self.cascade_config.max_acceptable_fpr, self.cascade_config.min_acceptable_tpr
        );
    }

    fn boost(&mut self, iteration: usize) -> State {
        if iteration >= self.config.iterations {
            return State::Terminate;
        }
        let remaining_negatives_valid = self.valid_remaining.iter()
            .any(|&raw| matches!(self.valid_dataset.example(raw).label(self.positive_class).map(|l| l.y), Some(Sign::Neg)));
        if !remaining_negatives_valid || self.train_remaining.is_empty() {
            return State::Terminate;
        }
        if self.current_stage_round >= self.cascade_config.max_stage_iterations {
            log::warn!("[ CASCADE ] stage {} exceeded its iteration cap, stopping training", self.stage_idx);
            return State::Terminate;
        }

        let (hyp, energy) = self.train_one_on_remaining();
        if energy.is_nan() {
            log::warn!("[ BREAK ] no non-degenerate weak hypothesis at iteration {iteration}");
            return State::Terminate;
        }

        self.apply_weight_update_on_remaining(&hyp);

        for &raw in &self.valid_remaining {
            let ex = self.valid_dataset.example(raw);
            self.valid_g[raw] += hyp.confidence(ex, self.positive_class);
        }
        self.current_stage_hyps.push(hyp);
        self.current_stage_round += 1;

        let (threshold, tpr, fpr) = self.evaluate_stage();
        log::info!(
            "[ ROUND {iteration} ] stage {} round {} tpr={tpr:.4} fpr={fpr:.4}",
            self.stage_idx, self.current_stage_round
        );

        if fpr <= self.cascade_config.max_acceptable_fpr && tpr >= self.cascade_config.min_acceptable_tpr {
            self.close_stage(threshold);
        }
        State::Continue
    }

    fn postprocess(self) -> Classifier {
        Classifier::new(self.ensemble, self.stages, PredictionRule::WinnerTakesAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeType, Example, Features, Label, Representation, WeightPolicy};
    use crate::strong_learner::StrongLearner;
    use crate::weak_learner::StumpLearner;

    fn separable_dataset(n: usize) -> Dataset {
        let examples: Vec<Example> = (0..n).map(|i| {
            let x = i as f64;
            let y = if i < n / 2 { Sign::Neg } else { Sign::Pos };
            Example::new(Features::Dense(vec![x]), vec![Label::new(0, y, 1.0 / n as f64)])
        }).collect();
        Dataset::load(
            examples,
            vec!["object".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        )
    }

    #[test]
    fn converges_and_rejects_all_negatives_eventually() {
        let mut config = TrainConfig::default();
        config.iterations = 20;
        let mut cascade_config = CascadeConfig::default();
        cascade_config.positive_label = "object".into();
        cascade_config.max_acceptable_fpr = 0.5;
        cascade_config.min_acceptable_tpr = 0.99;

        let mut vj = VjCascade::new(
            separable_dataset(20),
            separable_dataset(20),
            Box::new(StumpLearner::new()),
            config,
            cascade_config,
        );
        vj.preprocess();
        let mut t = 0;
        loop {
            match vj.boost(t) {
                State::Continue => t += 1,
                State::Terminate => break,
            }
            if t > 50 {
                break;
            }
        }
        assert!(!vj.ensemble.is_empty());
        assert!(!vj.stages.is_empty());
    }
}
