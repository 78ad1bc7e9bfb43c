//! Session success prediction
//!
//! - [`classifier`]: the [`SuccessModel`](classifier::SuccessModel) and
//!   [`Attributor`](classifier::Attributor) capability traits, a
//!   deterministic logistic-regression implementation, and the null
//!   attributor used when no attribution backend is available
//! - [`trainer`]: the leakage-safe training procedure (split before
//!   imputation, medians from the training split only)
//!
//! The rest of the pipeline treats the classifier and attributor as opaque
//! capabilities; swapping in a different model only requires implementing
//! the two traits.

pub mod classifier;
pub mod trainer;
