//! Pre-tokenization applied to text before segmentation.

pub mod normalize;

pub use normalize::{NormalizationForm, Normalizer};
