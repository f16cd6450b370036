//! Named scenarios.

use crate::error::SimError;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// John plants a tree, an observer looks at it several times
    Planting,

    /// Two objects with no common cell try to interact
    Disjoint,

    /// Several objects resolve on their own, no interactions
    Independent,

    /// Empty and all-zero distributions never resolve
    Vacuum,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Planting,
            ScenarioId::Disjoint,
            ScenarioId::Independent,
            ScenarioId::Vacuum,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Planting => "planting",
            ScenarioId::Disjoint => "disjoint",
            ScenarioId::Independent => "independent",
            ScenarioId::Vacuum => "vacuum",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Planting => "John plants a Tree, Observer1 sees it repeatedly: all settle on one cell",
            ScenarioId::Disjoint => "Left and Right halves never overlap: interaction is a no-op",
            ScenarioId::Independent => "Five peaked objects resolve independently via resolve_all",
            ScenarioId::Vacuum => "Empty and zero-weight objects stay in superposition",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planting" | "plant" | "tree" => Ok(ScenarioId::Planting),
            "disjoint" => Ok(ScenarioId::Disjoint),
            "independent" | "resolve_all" => Ok(ScenarioId::Independent),
            "vacuum" | "void" => Ok(ScenarioId::Vacuum),
            _ => Err(SimError::UnknownScenario(s.to_string())),
        }
    }
}
