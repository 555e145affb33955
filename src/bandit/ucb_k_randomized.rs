//! UCB-K-randomized (`Bandits/UCBKRandomized.{h,cpp}`): samples an arm
//! proportional to `X[a]/T[a]`, no exploration bonus.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{BanditAlgorithm, BanditState};

pub struct UcbKRandomized {
    state: BanditState,
    values: Vec<f64>,
    rng: StdRng,
}

impl UcbKRandomized {
    pub fn new(seed: u64) -> Self {
        Self { state: BanditState::new(), values: Vec::new(), rng: StdRng::seed_from_u64(seed) }
    }

    fn value(&self, a: usize) -> f64 {
        self.state.x[a] / self.state.t[a] as f64
    }

    fn sample_proportional(&mut self) -> usize {
        let total: f64 = self.values.iter().sum();
        if total <= 0.0 {
            return self.rng.gen_range(0..self.state.num_arms);
        }
        let r: f64 = self.rng.gen::<f64>() * total;
        let mut acc = 0.0;
        for (a, &v) in self.values.iter().enumerate() {
            acc += v;
            if r <= acc {
                return a;
            }
        }
        self.values.len() - 1
    }
}

impl BanditAlgorithm for UcbKRandomized {
    fn set_arm_number(&mut self, n: usize) {
        self.state.set_arm_number(n);
        self.values = vec![0.0; n];
    }

    fn arm_number(&self) -> usize {
        self.state.num_arms
    }

    fn initialize(&mut self, vals: &[f64]) {
        self.state.initialize(vals);
        self.values = (0..self.state.num_arms).map(|a| self.value(a)).collect();
    }

    fn get_next_action(&mut self) -> usize {
        self.sample_proportional()
    }

    fn receive_reward(&mut self, arm: usize, reward: f64) {
        self.state.x[arm] += reward;
        self.state.record(arm, reward);
        self.values[arm] = self.value(arm);
    }

    fn pulls(&self) -> &[u64] {
        &self.state.t
    }

    fn cumulative_rewards(&self) -> &[f64] {
        &self.state.x
    }

    fn history(&self) -> (&[f64], &[(usize, f64)]) {
        (&self.state.initial_vals, &self.state.log)
    }
}
