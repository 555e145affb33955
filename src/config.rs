//! Plain configuration structs mirroring the CLI surface of §6, without
//! the CLI parser itself (a Non-goal). An external harness populates
//! these one-to-one from flags and hands them to `strong_learner`, or
//! loads them from a JSON config file via `to_json`/`from_json`.
use crate::data::WeightPolicy;
use crate::error::{BoostError, Result};

/// `--stronglearner {AdaBoostMH|ArcGV|FilterBoost|VJcascade|SoftCascade}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StrongLearnerKind {
    AdaBoostMh,
    ArcGv,
    FilterBoost,
    VjCascade,
    SoftCascade,
}

/// `--earlystopping <tau_min> <beta> <lambda>`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EarlyStoppingConfig {
    pub tau_min: usize,
    pub beta: f64,
    pub lambda: f64,
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        Self { tau_min: 10, beta: 0.1, lambda: 1.1 }
    }
}

/// Knobs shared by AdaBoost.MH, arc-gv, and FilterBoost (§6).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TrainConfig {
    pub iterations: usize,
    pub weight_policy: WeightPolicy,
    pub learner: StrongLearnerKind,
    /// `--edgeoffset theta`.
    pub edge_offset: f64,
    /// `--constant`: always compare the trained weak hypothesis against
    /// the constant learner and keep whichever has lower energy.
    pub prefer_constant_on_tie: bool,
    pub force_constant_check: bool,
    pub early_stopping: Option<EarlyStoppingConfig>,
    /// `--timelimit minutes`, `0` meaning unbounded.
    pub time_limit_minutes: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            weight_policy: WeightPolicy::default(),
            learner: StrongLearnerKind::AdaBoostMh,
            edge_offset: 0.0,
            prefer_constant_on_tie: true,
            force_constant_check: false,
            early_stopping: None,
            time_limit_minutes: 0,
        }
    }
}

impl TrainConfig {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoostError::ConfigJson(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| BoostError::ConfigJson(e.to_string()))
    }
}

/// Knobs specific to the soft-cascade and VJ-cascade strong learners
/// (§6, "cascade-specific").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CascadeConfig {
    pub positive_label: String,
    pub detection_rate: f64,
    /// `--minacctpr`, the VJ-cascade per-stage `d_min`.
    pub min_acceptable_tpr: f64,
    /// `--maxaccfpr`, the VJ-cascade per-stage `f_max`.
    pub max_acceptable_fpr: f64,
    /// `--expalpha`: shape of the soft-cascade rejection-allowance profile.
    pub exp_alpha: f64,
    pub bootstrap: Option<(String, f64)>,
    /// Per-stage iteration cap (Open Question in §9: not exposed as a
    /// flag in the source; made explicit config here).
    pub max_stage_iterations: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            positive_label: String::new(),
            detection_rate: 0.99,
            min_acceptable_tpr: 0.99,
            max_acceptable_fpr: 0.6,
            exp_alpha: -2.0,
            bootstrap: None,
            max_stage_iterations: 10_000,
        }
    }
}

impl CascadeConfig {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoostError::ConfigJson(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| BoostError::ConfigJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_config_round_trips_through_json() {
        let mut cfg = TrainConfig::default();
        cfg.iterations = 42;
        cfg.learner = StrongLearnerKind::ArcGv;

        let json = cfg.to_json().unwrap();
        let reloaded = TrainConfig::from_json(&json).unwrap();
        assert_eq!(reloaded.iterations, 42);
        assert_eq!(reloaded.learner, StrongLearnerKind::ArcGv);
    }

    #[test]
    fn cascade_config_round_trips_through_json() {
        let mut cfg = CascadeConfig::default();
        cfg.positive_label = "face".into();
        cfg.detection_rate = 0.95;

        let json = cfg.to_json().unwrap();
        let reloaded = CascadeConfig::from_json(&json).unwrap();
        assert_eq!(reloaded.positive_label, "face");
        assert_eq!(reloaded.detection_rate, 0.95);
    }
}
