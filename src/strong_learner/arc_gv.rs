//! arc-gv (§4.6): identical loop to AdaBoost.MH, but the emitted alpha is
//! shrunk by a margin-floor correction so the ensemble keeps maximizing
//! the minimum margin rather than just the edge.
use crate::classifier::Classifier;
use crate::config::TrainConfig;
use crate::data::{Dataset, InputData};
use crate::output_info::OutputMetric;
use crate::weak_learner::{Hypothesis, WeakLearner};

use super::{AdaBoostMh, State, StrongLearner};

/// Floor applied to `rho_min` before it enters `ln((1+rho)/(1-rho))`, so a
/// pathological all-wrong ensemble never drives the correction to infinity.
const RHO_FLOOR: f64 = -0.999;

pub struct ArcGv {
    inner: AdaBoostMh,
}

impl ArcGv {
    pub fn new(
        dataset: Dataset,
        weak_learner: Box<dyn WeakLearner>,
        config: TrainConfig,
        metrics: Vec<OutputMetric>,
    ) -> Self {
        Self { inner: AdaBoostMh::new(dataset, weak_learner, config, metrics) }
    }

    pub fn with_test_data(mut self, test_dataset: Dataset) -> Self {
        self.inner = self.inner.with_test_data(test_dataset);
        self
    }

    /// `rho_min = min_{i,l} (sum_s alpha_s h_s(x_i,l) y_i,l) / sum_s alpha_s`,
    /// the minimum normalized margin over the ensemble trained so far
    /// (§4.6, "arc-gv").
    fn rho_min(&self) -> f64 {
        let data = &self.inner.dataset;
        let sum_alpha: f64 = self.inner.ensemble.iter().map(|h| h.alpha).sum();
        if sum_alpha <= 0.0 {
            return 0.0;
        }
        let mut min_margin = f64::INFINITY;
        for ex in data.examples() {
            for label in &ex.labels {
                if label.y == crate::data::Sign::Abstain {
                    continue;
                }
                let g: f64 = self.inner.ensemble.iter()
                    .map(|h| h.confidence(ex, label.class_idx))
                    .sum();
                let margin = g * label.y() / sum_alpha;
                if margin < min_margin {
                    min_margin = margin;
                }
            }
        }
        if min_margin.is_finite() { min_margin } else { 0.0 }
    }
}

impl StrongLearner for ArcGv {
    fn preprocess(&mut self) {
        self.inner.preprocess();
    }

    fn boost(&mut self, iteration: usize) -> State {
        if self.inner.config.iterations <= iteration {
            return State::Terminate;
        }

        let (hyp, energy, edge) = self.inner.train_one();
        if energy.is_nan() {
            log::warn!("[ BREAK ] no non-degenerate weak hypothesis at iteration {iteration}");
            return State::Terminate;
        }
        if edge <= self.inner.config.edge_offset {
            log::warn!("edge {edge:.6} <= theta at iteration {iteration}, continuing");
            return State::Continue;
        }

        let rho_min = self.rho_min().max(RHO_FLOOR).min(0.999);
        let correction = 0.5 * ((1.0 + rho_min) / (1.0 - rho_min)).ln();
        let corrected_alpha = hyp.alpha - correction;
        let corrected = Hypothesis::new(corrected_alpha, hyp.kind.clone());

        self.inner.apply_weight_update(&corrected);

        let view = InputData::new(&self.inner.dataset);
        self.inner.output.emit(&self.inner.dataset, &view, iteration, &corrected);
        drop(view);

        self.inner.ensemble.push(corrected);
        State::Continue
    }

    fn postprocess(self) -> Classifier {
        self.inner.postprocess()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeType, Example, Features, Label, Representation, Sign, WeightPolicy};
    use crate::weak_learner::StumpLearner;

    fn two_class_toy() -> Dataset {
        let xs = [0.0, 0.0, 1.0, 1.0];
        let ys = [Sign::Neg, Sign::Neg, Sign::Pos, Sign::Pos];
        let examples: Vec<Example> = xs.iter().zip(ys.iter()).map(|(&x, &y)| {
            Example::new(Features::Dense(vec![x]), vec![Label::new(0, y, 0.25)])
        }).collect();
        Dataset::load(
            examples,
            vec!["c0".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        )
    }

    #[test]
    fn emitted_alpha_is_shrunk_relative_to_adaboost() {
        let mut config = TrainConfig::default();
        config.iterations = 3;

        let mut arc = ArcGv::new(two_class_toy(), Box::new(StumpLearner::new()), config, vec![]);
        arc.preprocess();
        let mut t = 0;
        loop {
            match arc.boost(t) {
                State::Continue => t += 1,
                State::Terminate => break,
            }
        }
        assert!(!arc.inner.ensemble.is_empty());
        for hyp in &arc.inner.ensemble {
            assert!(hyp.alpha.is_finite());
        }
    }
}
