//! UCB-K (`Bandits/UCBK.{h,cpp}`): `argmax_a X[a]/T[a] + sqrt(2 ln t / T[a])`.
use super::{BanditAlgorithm, BanditState};

pub struct UcbK {
    state: BanditState,
    /// `(score, arm)`, kept sorted descending by score so
    /// `get_next_action`/`get_k_best_actions` are O(1)/O(k).
    scores: Vec<(f64, usize)>,
}

impl UcbK {
    pub fn new() -> Self {
        Self { state: BanditState::new(), scores: Vec::new() }
    }

    fn score(&self, a: usize) -> f64 {
        let t = self.state.t[a] as f64;
        self.state.x[a] / t + (2.0 * (self.state.iter_num as f64).ln() / t).sqrt()
    }

    fn resort(&mut self) {
        self.scores.sort_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap().then_with(|| a.1.cmp(&b.1))
        });
    }
}

impl Default for UcbK {
    fn default() -> Self {
        Self::new()
    }
}

impl BanditAlgorithm for UcbK {
    fn set_arm_number(&mut self, n: usize) {
        self.state.set_arm_number(n);
    }

    fn arm_number(&self) -> usize {
        self.state.num_arms
    }

    fn initialize(&mut self, vals: &[f64]) {
        self.state.initialize(vals);
        self.scores = (0..self.state.num_arms).map(|a| (self.score(a), a)).collect();
        self.resort();
    }

    fn get_next_action(&mut self) -> usize {
        self.scores[0].1
    }

    fn receive_reward(&mut self, arm: usize, reward: f64) {
        self.state.x[arm] += reward;
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

#[cfg(test)]
mod tests {
    use super::*;

    /// Seed scenario 3 (§8): rewards `[1,0,0,0,1,0,0,0,...]` deposited to
    /// arms `[0,1,2,3,0,1,2,3]`. After 16 rounds, arm 0's empirical pull
    /// share is at least half.
    #[test]
    fn scenario_arm_zero_dominates() {
        let mut b = UcbK::new();
        b.set_arm_number(4);
        b.initialize(&[0.0; 4]);

        let rewards = [1.0, 0.0, 0.0, 0.0];
        for round in 0..16 {
            let arm = b.get_next_action();
            // Deposit rewards per the scenario's fixed schedule, not the
            // arm UCB-K happens to pick, to match the scenario exactly.
            let scheduled_arm = round % 4;
            b.receive_reward(scheduled_arm, rewards[scheduled_arm]);
            let _ = arm;
        }

        let total: u64 = b.pulls().iter().sum();
        let share = b.pulls()[0] as f64 / total as f64;
        assert!(share >= 0.5, "share={share}");
    }
}
