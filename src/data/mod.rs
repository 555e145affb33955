//! The data model (§3): `Label`, `Example`, `Dataset`, `InputData`,
//! `SortedColumn`.
pub mod label;
pub mod example;
pub mod dataset;
pub mod weight_policy;
pub mod input_data;
pub mod sorted_column;

pub use label::{Label, Sign};
pub use example::{Example, Features};
pub use dataset::{AttributeType, Dataset, Representation};
pub use weight_policy::WeightPolicy;
pub use input_data::InputData;
pub use sorted_column::SortedColumn;
