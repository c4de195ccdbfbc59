//! Monthly trend projection and capacity risk for Aadhaar activity snapshots.
//!
//! [`trend::project`] and [`risk::classify`] are the core: pure functions over
//! an ordered series of monthly totals. The remaining modules load CSV
//! snapshots into that shape and report on the result.

pub mod analysis;
pub mod anomaly;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod monthly;
pub mod report;
pub mod risk;
pub mod trend;

pub use error::{AnalyticsError, Result};
