//! Uniform-random arm selection (`Bandits/Random.{h,cpp}` in the source).
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{BanditAlgorithm, BanditState};

pub struct RandomBandit {
    state: BanditState,
    rng: StdRng,
}

impl RandomBandit {
    pub fn new(seed: u64) -> Self {
        Self { state: BanditState::new(), rng: StdRng::seed_from_u64(seed) }
    }
}

impl BanditAlgorithm for RandomBandit {
    fn set_arm_number(&mut self, n: usize) {
        self.state.set_arm_number(n);
    }

    fn arm_number(&self) -> usize {
        self.state.num_arms
    }

    fn initialize(&mut self, vals: &[f64]) {
        self.state.initialize(vals);
    }

    fn get_next_action(&mut self) -> usize {
        self.rng.gen_range(0..self.state.num_arms)
    }

    fn receive_reward(&mut self, arm: usize, reward: f64) {
        self.state.x[arm] += reward;
        self.state.record(arm, reward);
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
