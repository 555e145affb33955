//! The crate's error hierarchy.
//!
//! Only *structural* failures are represented here (see `DESIGN.md` /
//! `SPEC_FULL.md` §7): a missing config flag, an unregistered weak-learner
//! name, a corrupted model file. Numerical anomalies encountered mid-loop
//! (NaN energy, a degenerate edge, a weight-sum drift) are recovered locally
//! and only `log::warn!`-ed, never routed through this enum — see
//! `strong_learner::adaboost_mh`.
use thiserror::Error;

/// Errors surfaced at training/classification startup or while reading a
/// serialized model. All are fatal: the caller aborts rather than recovers.
#[derive(Debug, Error)]
pub enum BoostError {
    /// A mandatory configuration option was missing, or two options
    /// contradicted each other (e.g. both `--constant` variants requested).
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O failure while reading or writing a model file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config file failed to parse as JSON (`TrainConfig`/`CascadeConfig`
    /// round trips, §2.1 "Config/serialization types" — distinct from the
    /// model file format, which stays tagged-text). Carried as a string
    /// rather than `#[from] serde_json::Error` since this crate builds
    /// `serde_json` without its `std` feature.
    #[error("config JSON error: {0}")]
    ConfigJson(String),

    /// The model file's header named a weak-learner that isn't registered.
    #[error("unregistered weak learner `{0}` in model header")]
    UnknownWeakLearner(String),

    /// The tagged-text reader hit a tag it could not parse into the
    /// expected field type (unknown tags are skipped, not an error; this
    /// is for a known tag with a malformed value).
    #[error("malformed model file: {0}")]
    Malformed(String),

    /// The model file's format/version tag didn't match what this build
    /// understands.
    #[error("model version mismatch: expected `{expected}`, found `{found}`")]
    VersionMismatch { expected: String, found: String },
}

/// Convenience alias used throughout the crate's fallible entry points.
pub type Result<T> = std::result::Result<T, BoostError>;
