//! Generic numeric routines shared across the analytics pipeline
//!
//! This crate collects the domain-agnostic numeric building blocks used by
//! the session analytics stages:
//!
//! - [`descriptive`]: means, medians and dispersion measures over `f64` data
//!   with explicit missing-value handling
//! - [`standardize`]: per-column z-score standardization fitted on one
//!   matrix and applicable to another
//! - [`kmeans`]: seeded Lloyd k-means with restarts, used for archetype
//!   clustering
//! - [`auc`]: rank-based ROC AUC for binary classifier validation
//!
//! All routines are deterministic: the only stochastic component (k-means
//! initialization) takes an explicit seed.

pub mod auc;
pub mod descriptive;
pub mod kmeans;
pub mod standardize;
