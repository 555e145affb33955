//! Bandit wrapper (§4.3): draws `k` candidate attributes from a bandit
//! algorithm, restricts the inner weak learner to that subset, and feeds
//! the resulting edge back as a reward.
use std::cell::RefCell;

use crate::bandit::BanditAlgorithm;
use crate::data::{Dataset, InputData, SortedColumn};

use super::{stump::StumpLearner, Hypothesis, WeakHypothesisKind, WeakLearner};

pub struct BanditLearner<B: BanditAlgorithm> {
    bandit: RefCell<B>,
    k: usize,
    initialized: RefCell<bool>,
}

impl<B: BanditAlgorithm> BanditLearner<B> {
    pub fn new(bandit: B, k: usize) -> Self {
        Self { bandit: RefCell::new(bandit), k: k.max(1), initialized: RefCell::new(false) }
    }
}

impl<B: BanditAlgorithm> WeakLearner for BanditLearner<B> {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let n_features = sorted.len();
        let mut bandit = self.bandit.borrow_mut();
        if bandit.arm_number() == 0 {
            bandit.set_arm_number(n_features);
        }
        if !*self.initialized.borrow() {
            bandit.initialize(&vec![0.0; n_features]);
            *self.initialized.borrow_mut() = true;
        }

        let chosen = bandit.get_k_best_actions(self.k.min(n_features));

        let mut restricted: Vec<Option<SortedColumn>> = vec![None; n_features];
        for &j in &chosen {
            restricted[j] = sorted[j].clone();
        }

        let inner = StumpLearner::new();
        let (hyp, energy) = inner.train(data, view, &restricted, theta);

        if !energy.is_nan() {
            let edge = hyp.edge(data, view, true);
            if let WeakHypothesisKind::Stump { feature, .. } = &hyp.kind {
                bandit.receive_reward(*feature, edge.abs());
            } else {
                for &j in &chosen {
                    bandit.receive_reward(j, 0.0);
                }
            }
        }

        let kind = WeakHypothesisKind::Bandit(Box::new(hyp.kind));
        (Hypothesis::new(hyp.alpha, kind), energy)
    }
}
