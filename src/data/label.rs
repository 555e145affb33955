//! Per-(example, class) label slot.

/// The sign of a label slot. `Abstain` contributes to neither the edge nor
/// the per-class weight mass (§GLOSSARY, "Abstention").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Sign {
    Pos,
    Neg,
    Abstain,
}

impl Sign {
    /// Maps to the `{-1, 0, +1}` encoding used in the closed-form edge/alpha
    /// formulas of §4.3.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Sign::Pos => 1.0,
            Sign::Neg => -1.0,
            Sign::Abstain => 0.0,
        }
    }

    #[inline]
    pub fn from_f64(y: f64) -> Self {
        if y > 0.0 {
            Sign::Pos
        } else if y < 0.0 {
            Sign::Neg
        } else {
            Sign::Abstain
        }
    }
}

/// One (class-index, sign, weight, initial-weight) slot of an example's
/// label vector.
///
/// `initial_weight` is frozen at load time (§3, "Label") and is never
/// touched by the boosting weight-update step; it is kept around purely for
/// the weighted-metric family in `output_info` (weighted 0-1 error,
/// weighted Hamming).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Label {
    pub class_idx: usize,
    pub y: Sign,
    pub weight: f64,
    pub initial_weight: f64,
}

impl Label {
    pub fn new(class_idx: usize, y: Sign, weight: f64) -> Self {
        Self { class_idx, y, weight, initial_weight: weight }
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y.as_f64()
    }
}
