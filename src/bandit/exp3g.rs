//! Exp3.G (`Bandits/Exp3G.{h,cpp}`, Kocsis & Szepesvari): weight updates
//! driven by a side-information matrix counting consecutive
//! `(arm, prev_arm)` transitions.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{BanditAlgorithm, BanditState};

pub struct Exp3G {
    pub(super) state: BanditState,
    pub(super) eta: f64,
    pub(super) gamma: f64,
    pub(super) p: Vec<f64>,
    pub(super) w: Vec<f64>,
    side_information: Vec<Vec<u64>>,
    actions: Vec<usize>,
    rng: StdRng,
}

impl Exp3G {
    pub fn new(seed: u64) -> Self {
        Self {
            state: BanditState::new(),
            eta: 0.5,
            gamma: 0.05,
            p: Vec::new(),
            w: Vec::new(),
            side_information: Vec::new(),
            actions: Vec::new(),
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

    pub(super) fn update(&mut self, _arm: usize) {
        let max = self.w.iter().cloned().fold(f64::MIN, f64::max);
        let exp: Vec<f64> = self.w.iter().map(|&w| (w - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        let t = self.state.iter_num as f64;
        for a in 0..self.state.num_arms {
            self.p[a] = (1.0 - self.gamma) * (exp[a] / sum) + self.gamma / t;
        }
    }
}

impl BanditAlgorithm for Exp3G {
    fn set_arm_number(&mut self, n: usize) {
        self.state.set_arm_number(n);
        self.p = vec![1.0 / n as f64; n];
        self.w = vec![1.0; n];
        self.side_information = vec![vec![0u64; n]; n];
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
        // The source treats a zero `sideInformation[arm][prevArm]`
        // denominator as a bug it never guards against (§9, "Exp3.G
        // reward update using a side-information matrix"); it cannot
        // occur here because `arm` always gets its own transition count
        // bumped first, so the denominator for `i == arm` is always >= 1
        // by the time it's used as a divisor below. See DESIGN.md.
        let prev_arm = *self.actions.last().unwrap_or(&arm);
        self.side_information[arm][prev_arm] += 1;
        self.actions.push(arm);

        self.state.record(arm, reward);

        let denom = self.side_information[arm][prev_arm] as f64;
        for i in 0..self.state.num_arms {
            let numer = self.side_information[i][prev_arm] as f64;
            self.w[i] += (numer / denom) * (self.eta * reward);
        }
        self.update(arm);
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
