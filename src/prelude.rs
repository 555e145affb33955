//! Exports the standard boosting types and traits.

pub use crate::strong_learner::{
    StrongLearner,
    State,

    AdaBoostMh,
    ArcGv,
    FilterBoost,
    SoftCascade,
    VjCascade,
};

pub use crate::weak_learner::{
    WeakLearner,
    Hypothesis,
    WeakHypothesisKind,

    StumpLearner,
    ConstantLearner,
    SelectorLearner,
    OneClassLearner,
    TreeLearner,
    TreeNode,
    ProductLearner,
    HaarLearner,
    BanditLearner,
};

pub use crate::bandit::{
    BanditAlgorithm,
    RandomBandit,
    UcbK,
    UcbKv,
    UcbKRandomized,
    Exp3,
    Exp3G,
    Exp3G2,
};

pub use crate::data::{
    Dataset,
    InputData,
    SortedColumn,
    Example,
    Features,
    Label,
    Sign,
    AttributeType,
    Representation,
    WeightPolicy,
};

pub use crate::classifier::{Classifier, PredictionRule, Outcome};

pub use crate::config::{TrainConfig, CascadeConfig, StrongLearnerKind, EarlyStoppingConfig};

pub use crate::output_info::{OutputInfo, OutputMetric};

pub use crate::error::{BoostError, Result};
