//! The strong-learner family (§4.6): AdaBoost.MH and its arc-gv,
//! FilterBoost, soft-cascade and Viola-Jones-cascade cousins.
pub mod adaboost_mh;
pub mod arc_gv;
pub mod filter_boost;
pub mod soft_cascade;
pub mod vj_cascade;

pub use adaboost_mh::AdaBoostMh;
pub use arc_gv::ArcGv;
pub use filter_boost::FilterBoost;
pub use soft_cascade::SoftCascade;
pub use vj_cascade::VjCascade;

use crate::classifier::Classifier;

/// Mirrors the teacher's `preprocess`/`boost`/`postprocess` cycle
/// (`booster::core::Booster`), generalized to this spec's weak/strong
/// learner split: `boost` runs one training iteration and reports whether
/// the loop should continue.
pub trait StrongLearner {
    fn preprocess(&mut self);

    /// Runs iteration `t`. `Continue` to keep training; `Terminate` stops
    /// the loop (edge exhausted, time budget hit, or `T` reached).
    fn boost(&mut self, iteration: usize) -> State;

    fn postprocess(self) -> Classifier;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Continue,
    Terminate,
}
