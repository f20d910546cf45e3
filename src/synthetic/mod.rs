//! Synthetic data generation module
//!
//! Generates the reference population that attribution baselines are
//! measured against. The population is a tractable proxy drawn from fixed
//! per-field distributions, not a sample of the training data.

mod background;

pub use background::{
    default_ranges, generate_background, BackgroundDataset, BackgroundGenerator, NumericRange,
    DEFAULT_BACKGROUND_SAMPLES, DEFAULT_BACKGROUND_SEED,
};
