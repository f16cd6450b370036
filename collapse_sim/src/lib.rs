//! Collapse Scenario Harness
//!
//! Builds small worlds of probabilistic objects, drives them through a
//! scripted sequence of interactions, and checks the outcome. Every run is
//! reproducible: all draws come from one [`SeededSource`] built from the
//! run's seed.
//!
//! # Usage
//!
//! ```
//! use collapse_sim::{ScenarioRunner, SimConfig};
//! use collapse_sim::scenarios::ScenarioId;
//!
//! let runner = ScenarioRunner::new(SimConfig { seed: 7, ..Default::default() });
//! let result = runner.run(ScenarioId::Planting).unwrap();
//! assert!(result.passed);
//! ```
//!
//! [`SeededSource`]: collapse_core::SeededSource

mod config;
mod error;
mod exporter;
mod runner;
pub mod scenarios;
pub mod setup;

pub use config::SimConfig;
pub use error::SimError;
pub use exporter::{ObjectSnapshot, SimExport};
pub use runner::{ScenarioResult, ScenarioRunner};
