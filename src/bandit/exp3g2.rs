//! Exp3.G2 (`Bandits/Exp3G2.{h,cpp}`): like Exp3.G, but receives a full
//! reward vector per round and updates every arm's weight unconditionally.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{BanditAlgorithm, BanditState};

pub struct Exp3G2 {
    state: BanditState,
    eta: f64,
    gamma: f64,
    p: Vec<f64>,
    w: Vec<f64>,
    rng: StdRng,
}

impl Exp3G2 {
    pub fn new(seed: u64) -> Self {
        Self {
            state: BanditState::new(),
            eta: 0.5,
            gamma: 0.05,
            p: Vec::new(),
            w: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    fn update(&mut self) {
        let max = self.w.iter().cloned().fold(f64::MIN, f64::max);
        let exp: Vec<f64> = self.w.iter().map(|&w| (w - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        let t = self.state.iter_num as f64;
        for a in 0..self.state.num_arms {
            self.p[a] = (1.0 - self.gamma) * (exp[a] / sum) + self.gamma / t;
        }
    }

    /// Receives a reward for every arm simultaneously (the full-feedback
    /// variant the source also supports: `Exp3G2::receiveReward(vector)`).
    pub fn receive_reward_vector(&mut self, rewards: &[f64]) {
        self.state.iter_num += 1;
        for a in 0..self.state.num_arms {
            self.w[a] += self.eta * rewards[a];
        }
        self.update();
    }
}

impl BanditAlgorithm for Exp3G2 {
    fn set_arm_number(&mut self, n: usize) {
        self.state.set_arm_number(n);
        self.p = vec![1.0 / n as f64; n];
        self.w = vec![1.0; n];
    }

    fn arm_number(&self) -> usize {
        self.state.num_arms
    }

    fn initialize(&mut self, vals: &[f64]) {
        self.state.initialize(vals);
        for a in 0..self.state.num_arms {
            self.w[a] = self.eta * self.state.x[a];
        }
    }

    fn get_next_action(&mut self) -> usize {
        let total: f64 = self.p.iter().sum();
        let r: f64 = self.rng.gen::<f64>() * total;
        let mut acc = 0.0;
        for (a, &p) in self.p.iter().enumerate() {
            acc += p;
            if r <= acc {
                return a;
            }
        }
        self.p.len() - 1
    }

    fn receive_reward(&mut self, arm: usize, reward: f64) {
        self.state.t[arm] += 1;
        self.state.iter_num += 1;
        self.state.log.push((arm, reward));
        for a in 0..self.state.num_arms {
            self.w[a] += self.eta * reward;
        }
        self.update();
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
