//! Per-tab body rendering.

pub mod calculator;
pub mod instruments;
