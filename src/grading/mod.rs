// src/grading/mod.rs

//! Quiz scoring and performance classification.
//!
//! Both operations are pure and total: they never fail and never touch storage.

pub mod performance;
pub mod scoring;

pub use performance::{Performance, Tier, classify};
pub use scoring::{Score, score};
