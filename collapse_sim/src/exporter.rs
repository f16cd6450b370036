//! JSON export of final object states.

use crate::config::SimConfig;
use crate::error::SimError;
use crate::runner::ScenarioResult;
use collapse_core::{Coordinate, CorrelationPolicy, ProbabilisticObject};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// State of one object at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub name: String,
    pub resolved: bool,

    /// Final cell, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,

    /// Most likely cell, when still unresolved with a viable distribution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak: Option<Coordinate>,

    pub description: String,
}

impl ObjectSnapshot {
    pub fn capture(object: &ProbabilisticObject) -> Self {
        let coordinate = object.final_coordinate();
        let peak = match coordinate {
            Some(_) => None,
            None => object.distribution().mode().map(|(c, _)| c),
        };

        Self {
            name: object.name().to_string(),
            resolved: object.is_resolved(),
            coordinate,
            peak,
            description: object.description(),
        }
    }
}

/// Complete export of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    pub width: i32,
    pub height: i32,
    pub policy: CorrelationPolicy,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    pub objects: Vec<ObjectSnapshot>,
}

impl SimExport {
    /// Builds an export from a finished run.
    pub fn new(result: &ScenarioResult, config: &SimConfig) -> Self {
        Self {
            scenario: result.scenario.name().to_string(),
            seed: result.seed,
            width: config.width,
            height: config.height,
            policy: config.policy,
            passed: result.passed,
            failure_reason: result.failure_reason.clone(),
            objects: result.objects.clone(),
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
