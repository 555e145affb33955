//! UCB-KV (`Bandits/UCBKV.{h,cpp}`): mean + a variance-aware exploration
//! bonus, `xi=1, c=1/3, b=1` by default.
use super::{BanditAlgorithm, BanditState};

pub struct UcbKv {
    state: BanditState,
    rewards_by_arm: Vec<Vec<f64>>,
    xi: f64,
    c: f64,
    b: f64,
    scores: Vec<(f64, usize)>,
}

impl UcbKv {
    pub fn new() -> Self {
        Self {
            state: BanditState::new(),
            rewards_by_arm: Vec::new(),
            xi: 1.0,
            c: 1.0 / 3.0,
            b: 1.0,
            scores: Vec::new(),
        }
    }

    fn score(&self, a: usize) -> f64 {
        let t = self.state.t[a] as f64;
        let mean = self.state.x[a] / t;
        let variance = if self.rewards_by_arm[a].is_empty() {
            0.0
        } else {
            self.rewards_by_arm[a].iter()
                .map(|&r| (r - mean) * (r - mean))
                .sum::<f64>() / t
        };
        let ln_t = (self.state.iter_num as f64).ln();
        mean + (2.0 * self.xi * variance * ln_t / t).sqrt()
            + self.c * (3.0 * self.b * self.xi * ln_t) / t
    }

    fn resort(&mut self) {
        self.scores.sort_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap().then_with(|| a.1.cmp(&b.1))
        });
    }
}

impl Default for UcbKv {
    fn default() -> Self {
        Self::new()
    }
}

impl BanditAlgorithm for UcbKv {
    fn set_arm_number(&mut self, n: usize) {
        self.state.set_arm_number(n);
        self.rewards_by_arm = vec![Vec::new(); n];
    }

    fn arm_number(&self) -> usize {
        self.state.num_arms
    }

    fn initialize(&mut self, vals: &[f64]) {
        self.state.initialize(vals);
        for (a, &v) in vals.iter().enumerate() {
            self.rewards_by_arm[a] = vec![v];
        }
        self.scores = (0..self.state.num_arms).map(|a| (self.score(a), a)).collect();
        self.resort();
    }

    fn get_next_action(&mut self) -> usize {
        self.scores[0].1
    }

    fn receive_reward(&mut self, arm: usize, reward: f64) {
        self.state.x[arm] += reward;
        self.rewards_by_arm[arm].push(reward);
        self.state.record(arm, reward);
        let new_score = self.score(arm);
        if let Some(slot) = self.scores.iter_mut().find(|(_, a)| *a == arm) {
            slot.0 = new_score;
        }
        self.resort();
    }

    fn get_k_best_actions(&mut self, k: usize) -> Vec<usize> {
        self.scores.iter().take(k).map(|&(_, a)| a).collect()
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
