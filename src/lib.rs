//! A multi-class, multi-label boosting engine.
//!
//! `data` holds the example/label/dataset model; `weak_learner` and
//! `bandit` provide the base-hypothesis family and the bandit-driven
//! feature-selection oracle inside it; `strong_learner` drives the
//! AdaBoost.MH training loop and its arc-gv, FilterBoost, soft-cascade and
//! Viola-Jones-cascade cousins; `serialization` and `classifier` round-trip
//! a trained ensemble through a tagged-text model file; `output_info`
//! reports per-iteration metrics.
pub mod bandit;
pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod output_info;
pub mod prelude;
pub mod serialization;
pub mod strong_learner;
pub mod weak_learner;
