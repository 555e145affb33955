//! Soft cascade (§4.6): consumes a pool of already-trained weak hypotheses
//! and re-orders/truncates them into a cascade with per-stage rejection
//! thresholds, rather than training fresh ones.
use crate::classifier::{Classifier, PredictionRule};
use crate::config::CascadeConfig;
use crate::data::{Dataset, Sign};
use crate::serialization::StageMarker;
use crate::weak_learner::Hypothesis;

use super::State;

pub struct SoftCascade {
    dataset: Dataset,
    candidates: Vec<Option<Hypothesis>>,
    config: CascadeConfig,
    positive_class: usize,
    /// Cumulative sum of the precomputed `v_t` rejection-allowance profile
    /// (§4.6), one prefix sum per candidate slot; `allowance_cum[T-1] == 1 -
    /// d_hat`.
    allowance_cum: Vec<f64>,
    /// Running cumulative score per raw example index.
    g: Vec<f64>,
    /// Raw indices still in play (not yet rejected as a filtered negative).
    remaining_raw: Vec<usize>,
    selected: Vec<Hypothesis>,
    thresholds: Vec<f64>,
    bootstrap_pool: Option<Dataset>,
}

impl SoftCascade {
    pub fn new(dataset: Dataset, candidates: Vec<Hypothesis>, config: CascadeConfig) -> Self {
        let positive_class = dataset.class_index(&config.positive_label).unwrap_or(0);
        let n = dataset.n_examples();
        let t_total = candidates.len().max(1);

        let raw_profile: Vec<f64> = (0..t_total)
            .map(|t| (config.exp_alpha * t as f64 / t_total as f64).exp())
            .collect();
        let profile_sum: f64 = raw_profile.iter().sum();
        let target_allowance = 1.0 - config.detection_rate;
        let allowance: Vec<f64> = raw_profile.iter()
            .map(|&r| if profile_sum > 0.0 { r / profile_sum * target_allowance } else { 0.0 })
            .collect();
        let mut allowance_cum = Vec::with_capacity(allowance.len());
        let mut running = 0.0;
        for &v in &allowance {
            running += v;
            allowance_cum.push(running);
        }

        Self {
            remaining_raw: (0..n).collect(),
            g: vec![0.0; n],
            candidates: candidates.into_iter().map(Some).collect(),
            dataset,
            config,
            positive_class,
            allowance_cum,
            selected: Vec::new(),
            thresholds: Vec::new(),
            bootstrap_pool: None,
        }
    }

    /// Held-out negatives to (conceptually) replenish rejected ones from
    /// (§4.6, "optionally bootstrap"). Parsing/loading the pool itself is
    /// an external collaborator's job; this only accepts an already-loaded
    /// `Dataset`.
    pub fn with_bootstrap_pool(mut self, pool: Dataset) -> Self {
        self.bootstrap_pool = Some(pool);
        self
    }

    /// `edge+/N+ - edge-/N-` for `hyp` restricted to the positive class and
    /// the examples still in play (§4.6, "class-balanced separation").
    fn class_balanced_score(&self, hyp: &Hypothesis) -> f64 {
        let (mut edge_pos, mut edge_neg, mut n_pos, mut n_neg) = (0.0, 0.0, 0.0, 0.0);
        for &raw in &self.remaining_raw {
            let ex = self.dataset.example(raw);
            let Some(label) = ex.label(self.positive_class) else { continue };
            if label.y == Sign::Abstain {
                continue;
            }
            let contribution = label.weight * hyp.classify(ex, self.positive_class) * label.y();
            match label.y {
                Sign::Pos => { edge_pos += contribution; n_pos += 1.0; }
                Sign::Neg => { edge_neg += contribution; n_neg += 1.0; }
                Sign::Abstain => unreachable!(),
            }
        }
        let a = if n_pos > 0.0 { edge_pos / n_pos } else { 0.0 };
        let b = if n_neg > 0.0 { edge_neg / n_neg } else { 0.0 };
        a - b
    }

    fn pick_best_candidate(&self) -> Option<usize> {
        self.candidates.iter().enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|h| (i, h)))
            .map(|(i, h)| (i, self.class_balanced_score(h)))
            .fold(None, |best: Option<(usize, f64)>, (i, score)| {
                match best {
                    Some((_, b)) if b >= score => best,
                    _ => Some((i, score)),
                }
            })
            .map(|(i, _)| i)
    }

    /// Largest threshold keeping the cumulative false-negative fraction
    /// over ALL original positive examples at or below `allowance_cum[t]`
    /// (§4.6). Rejection itself only ever removes negatives.
    fn threshold_for(&self, cum_allowance: f64) -> f64 {
        let mut pos_scores: Vec<f64> = self.dataset.examples().iter().enumerate()
            .filter(|(_, ex)| ex.label(self.positive_class).map(|l| l.y == Sign::Pos).unwrap_or(false))
            .map(|(raw, _)| self.g[raw])
            .collect();
        pos_scores.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let n_pos_total = pos_scores.len();
        if n_pos_total == 0 {
            return f64::NEG_INFINITY;
        }
        let max_fn = (cum_allowance * n_pos_total as f64).floor() as usize;
        if max_fn < n_pos_total { pos_scores[max_fn] } else { f64::NEG_INFINITY }
    }
}

impl super::StrongLearner for SoftCascade {
    fn preprocess(&mut self) {
        log::info!(
            "[ CASCADE ] {} candidates, target detection rate {:.4}",
            self.candidates.len(), self.config.detection_rate
        );
    }

    fn boost(&mut self, iteration: usize) -> State {
        if iteration >= self.candidates.len() || self.remaining_raw.is_empty() {
            return State::Terminate;
        }

        let Some(best_idx) = self.pick_best_candidate() else {
            return State::Terminate;
        };
        let hyp = self.candidates[best_idx].take().expect("index came from a Some slot");

        for &raw in &self.remaining_raw {
            let ex = self.dataset.example(raw);
            self.g[raw] += hyp.confidence(ex, self.positive_class);
        }

        let cum_allowance = self.allowance_cum[iteration];
        let threshold = self.threshold_for(cum_allowance);

        let before = self.remaining_raw.len();
        self.remaining_raw.retain(|&raw| {
            let ex = self.dataset.example(raw);
            match ex.label(self.positive_class).map(|l| l.y) {
                Some(Sign::Neg) => self.g[raw] >= threshold,
                _ => true,
            }
        });
        let rejected_now = before - self.remaining_raw.len();
        if rejected_now > 0 {
            if let Some(pool) = &self.bootstrap_pool {
                log::info!(
                    "[ CASCADE ] stage {iteration} rejected {rejected_now} negatives, {} available for bootstrap",
                    pool.n_examples()
                );
            }
        }

        log::info!(
            "[ ROUND {iteration} ] cascade threshold={threshold:.6} remaining={}",
            self.remaining_raw.len()
        );

        self.thresholds.push(threshold);
        self.selected.push(hyp.with_threshold(threshold));
        State::Continue
    }

    fn postprocess(self) -> Classifier {
        let stages: Vec<StageMarker> = self.selected.iter().enumerate()
            .zip(self.thresholds.iter())
            .map(|((idx, _), &threshold)| StageMarker { idx, n_weak_hyp: 1, threshold })
            .collect();
        Classifier::new(self.selected, stages, PredictionRule::WinnerTakesAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeType, Example, Features, Label, Representation, WeightPolicy};
    use crate::strong_learner::StrongLearner;
    use crate::weak_learner::WeakHypothesisKind;

    fn toy_dataset() -> Dataset {
        let xs = [0.0, 0.1, 0.2, 0.9, 1.0, 1.1];
        let ys = [Sign::Neg, Sign::Neg, Sign::Neg, Sign::Pos, Sign::Pos, Sign::Pos];
        let examples: Vec<Example> = xs.iter().zip(ys.iter()).map(|(&x, &y)| {
            Example::new(Features::Dense(vec![x]), vec![Label::new(0, y, 1.0 / 6.0)])
        }).collect();
        Dataset::load(
            examples,
            vec!["object".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        )
    }

    fn stump(feature: usize, threshold: f64, polarity: Vec<f64>) -> Hypothesis {
        Hypothesis::new(1.0, WeakHypothesisKind::Stump { feature, threshold, polarity })
    }

    #[test]
    fn stages_grow_and_thresholds_are_finite_or_neg_inf() {
        let data = toy_dataset();
        let candidates = vec![stump(0, 0.5, vec![1.0])];
        let mut config = CascadeConfig::default();
        config.positive_label = "object".into();

        let mut cascade = SoftCascade::new(data, candidates, config);
        cascade.preprocess();
        assert_eq!(cascade.boost(0), State::Continue);
        assert_eq!(cascade.boost(1), State::Terminate);
        assert_eq!(cascade.selected.len(), 1);
    }
}
