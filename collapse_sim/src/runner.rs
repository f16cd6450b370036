//! Scenario runner - executes scenarios and checks their outcomes.

use crate::config::SimConfig;
use crate::error::SimError;
use crate::exporter::ObjectSnapshot;
use crate::scenarios::ScenarioId;
use crate::setup;

use collapse_core::{
    Coordinate, CorrelationPolicy, InteractionOutcome, SeededSource, SharedObject, Space,
};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all checks
    pub passed: bool,

    /// Interactions attempted
    pub interactions: usize,

    /// Interactions that correlated and resolved their participants
    pub correlated: usize,

    /// Objects resolved at the end of the run
    pub resolved: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Final state of every object, in space order
    pub objects: Vec<ObjectSnapshot>,
}

/// Tally and failed checks accumulated during one run.
#[derive(Debug, Default)]
struct RunLog {
    interactions: usize,
    correlated: usize,
    failures: Vec<String>,
}

impl RunLog {
    fn record(&mut self, label: &str, outcome: InteractionOutcome) {
        self.interactions += 1;
        if outcome.is_correlated() {
            self.correlated += 1;
        }
        debug!("{}: {:?}", label, outcome);
    }

    fn check(&mut self, ok: bool, failure: impl FnOnce() -> String) {
        if !ok {
            let reason = failure();
            warn!("Check failed: {}", reason);
            self.failures.push(reason);
        }
    }
}

/// Runs scenarios against a fixed configuration.
pub struct ScenarioRunner {
    config: SimConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs a scenario and returns the result.
    ///
    /// Fails only if the configuration cannot produce the scenario's space.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!(
            "Starting scenario: {} (seed={}, {}x{}, policy={})",
            scenario.name(),
            self.config.seed,
            self.config.width,
            self.config.height,
            self.config.policy.name()
        );

        let mut rng = SeededSource::new(self.config.seed);
        let mut log = RunLog::default();

        let space = match scenario {
            ScenarioId::Planting => self.run_planting(&mut rng, &mut log)?,
            ScenarioId::Disjoint => self.run_disjoint(&mut rng, &mut log)?,
            ScenarioId::Independent => self.run_independent(&mut rng, &mut log)?,
            ScenarioId::Vacuum => self.run_vacuum(&mut rng, &mut log)?,
        };

        for description in space.descriptions() {
            debug!("  {}", description);
        }

        Ok(self.finish(scenario, &space, log))
    }

    /// John and Tree interact once, Observer1 and Tree interact repeatedly,
    /// then everything resolves.
    ///
    /// **Assertion**: all resolved; John and Tree share a cell; with at least
    /// one observation under the point-mass policy, Observer1 shares it too.
    fn run_planting(&self, rng: &mut SeededSource, log: &mut RunLog) -> Result<Space, SimError> {
        let space = setup::planting(&self.config)?;
        let tree = named(&space, "Tree")?;
        let john = named(&space, "John")?;
        let observer = named(&space, "Observer1")?;

        log.record("John <-> Tree", space.interact(&john, &tree, rng));
        for i in 0..self.config.observations {
            let label = format!("Observer1 <-> Tree #{}", i + 1);
            log.record(&label, space.interact(&observer, &tree, rng));
        }
        space.resolve_all(rng);

        let tree_at = tree.borrow().final_coordinate();
        let john_at = john.borrow().final_coordinate();
        let observer_at = observer.borrow().final_coordinate();

        log.check(space.resolved_count() == space.len(), || {
            format!("{}/{} objects resolved", space.resolved_count(), space.len())
        });
        log.check(tree_at.is_some() && tree_at == john_at, || {
            format!("John at {}, Tree at {}", at(john_at), at(tree_at))
        });
        if self.config.observations > 0 && space.policy() == CorrelationPolicy::PointMass {
            log.check(observer_at == tree_at, || {
                format!("Observer1 at {}, Tree at {}", at(observer_at), at(tree_at))
            });
        }

        Ok(space)
    }

    /// Left and Right never share a cell, so their interaction must change
    /// nothing; each then resolves inside its own half.
    fn run_disjoint(&self, rng: &mut SeededSource, log: &mut RunLog) -> Result<Space, SimError> {
        let space = setup::disjoint(&self.config)?;
        let left = named(&space, "Left")?;
        let right = named(&space, "Right")?;
        let split = self.config.width / 2;

        let left_before = left.borrow().distribution().clone();
        let right_before = right.borrow().distribution().clone();

        let outcome = space.interact(&left, &right, rng);
        log.record("Left <-> Right", outcome);

        log.check(outcome == InteractionOutcome::NoOverlap, || {
            format!("expected no overlap, got {:?}", outcome)
        });
        log.check(
            left.borrow().distribution() == &left_before
                && right.borrow().distribution() == &right_before,
            || "distributions changed by a no-overlap interaction".to_string(),
        );
        log.check(
            !left.borrow().is_resolved() && !right.borrow().is_resolved(),
            || "no-overlap interaction resolved an object".to_string(),
        );

        space.resolve_all(rng);

        let left_at = left.borrow().final_coordinate();
        let right_at = right.borrow().final_coordinate();
        log.check(left_at.is_some_and(|c| c.x < split), || {
            format!("Left resolved at {}", at(left_at))
        });
        log.check(right_at.is_some_and(|c| c.x >= split), || {
            format!("Right resolved at {}", at(right_at))
        });

        Ok(space)
    }

    /// No interactions: resolve_all alone settles every object on the grid.
    fn run_independent(&self, rng: &mut SeededSource, log: &mut RunLog) -> Result<Space, SimError> {
        let space = setup::independent(&self.config)?;

        let newly = space.resolve_all(rng);
        log.check(newly == space.len(), || {
            format!("{}/{} objects resolved", newly, space.len())
        });

        for object in space.objects() {
            let object = object.borrow();
            let cell = object.final_coordinate();
            let inside = cell.is_some_and(|c| {
                (0..self.config.width).contains(&c.x) && (0..self.config.height).contains(&c.y)
            });
            log.check(inside, || format!("{} resolved at {}", object.name(), at(cell)));
        }

        Ok(space)
    }

    /// Degenerate objects can neither interact nor resolve; the uniform
    /// anchor is unaffected by them and still resolves.
    fn run_vacuum(&self, rng: &mut SeededSource, log: &mut RunLog) -> Result<Space, SimError> {
        let space = setup::vacuum(&self.config)?;
        let void = named(&space, "Void")?;
        let ghost = named(&space, "Ghost")?;
        let anchor = named(&space, "Anchor")?;

        for (label, object) in [("Void <-> Anchor", &void), ("Ghost <-> Anchor", &ghost)] {
            let outcome = space.interact(object, &anchor, rng);
            log.record(label, outcome);
            log.check(outcome == InteractionOutcome::NoOverlap, || {
                format!("{}: expected no overlap, got {:?}", label, outcome)
            });
        }

        let newly = space.resolve_all(rng);
        log.check(newly == 1 && anchor.borrow().is_resolved(), || {
            format!("expected only Anchor to resolve, {} resolved", newly)
        });
        log.check(
            !void.borrow().is_resolved() && !ghost.borrow().is_resolved(),
            || "a degenerate object resolved".to_string(),
        );

        Ok(space)
    }

    fn finish(&self, scenario: ScenarioId, space: &Space, log: RunLog) -> ScenarioResult {
        let objects: Vec<ObjectSnapshot> = space
            .objects()
            .iter()
            .map(|o| ObjectSnapshot::capture(&o.borrow()))
            .collect();

        let passed = log.failures.is_empty();
        ScenarioResult {
            scenario,
            seed: self.config.seed,
            passed,
            interactions: log.interactions,
            correlated: log.correlated,
            resolved: space.resolved_count(),
            failure_reason: if passed {
                None
            } else {
                Some(log.failures.join("; "))
            },
            objects,
        }
    }
}

fn named(space: &Space, name: &str) -> Result<SharedObject, SimError> {
    setup::find(space, name).ok_or_else(|| SimError::MissingObject(name.to_string()))
}

fn at(cell: Option<Coordinate>) -> String {
    cell.map_or_else(|| "unresolved".to_string(), |c| c.to_string())
}
