//! Probabilistic objects and their resolution lifecycle.
//!
//! An object is created unresolved, holding a weighted [`Distribution`] over
//! grid cells. [`ProbabilisticObject::resolve`] performs a weighted random
//! draw and fixes the object to one cell. The transition happens at most
//! once:
//!
//! ```text
//!   Unresolved ──resolve (viable draw)──► Resolved(cell)
//!       │
//!       └──resolve (empty / zero total)──► Unresolved (unchanged)
//! ```

use crate::coordinate::Coordinate;
use crate::distribution::Distribution;
use crate::error::CollapseError;
use crate::random::RandomSource;
use crate::space::CorrelationPolicy;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Shared handle to an object.
///
/// A [`Space`](crate::Space) and the caller can both hold handles to the same
/// object; identity is the handle's pointer, not the object's name.
pub type SharedObject = Rc<RefCell<ProbabilisticObject>>;

/// Resolution state of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Still spread over its distribution
    Unresolved,

    /// Fixed at a single cell
    Resolved(Coordinate),
}

/// What a call to `resolve` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The draw succeeded and fixed the object at this cell
    Resolved(Coordinate),

    /// Already resolved earlier; nothing changed and no draw was consumed
    AlreadyResolved(Coordinate),

    /// Empty or zero-total distribution; object left unresolved
    NoViableOutcome,
}

impl ResolveOutcome {
    /// The cell the object sits at after the call, if any.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            ResolveOutcome::Resolved(c) | ResolveOutcome::AlreadyResolved(c) => Some(*c),
            ResolveOutcome::NoViableOutcome => None,
        }
    }

    /// True only if this call performed the transition.
    pub fn is_newly_resolved(&self) -> bool {
        matches!(self, ResolveOutcome::Resolved(_))
    }
}

/// A named object whose position is a weighted distribution until resolved.
#[derive(Debug, Clone)]
pub struct ProbabilisticObject {
    name: String,
    distribution: Distribution,
    state: ObjectState,
}

impl ProbabilisticObject {
    /// Creates an unresolved object. Weights are taken as given.
    pub fn new(name: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            distribution,
            state: ObjectState::Unresolved,
        }
    }

    /// Creates an unresolved object, rejecting negative or non-finite weights.
    pub fn try_new<I>(name: impl Into<String>, weights: I) -> Result<Self, CollapseError>
    where
        I: IntoIterator<Item = (Coordinate, f64)>,
    {
        Ok(Self::new(name, Distribution::try_from_weights(weights)?))
    }

    /// Wraps the object in a shared handle.
    pub fn shared(self) -> SharedObject {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, ObjectState::Resolved(_))
    }

    /// The cell this object resolved to, if it has.
    pub fn final_coordinate(&self) -> Option<Coordinate> {
        match self.state {
            ObjectState::Resolved(c) => Some(c),
            ObjectState::Unresolved => None,
        }
    }

    /// Normalizes the stored distribution in place.
    pub fn normalize(&mut self) {
        self.distribution.normalize();
    }

    /// Draws a cell from the distribution and fixes the object there.
    ///
    /// No-op if already resolved. An empty or zero-total distribution leaves
    /// the object unresolved. Neither case consumes a draw.
    pub fn resolve<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> ResolveOutcome {
        if let Some(outcome) = self.precheck() {
            return outcome;
        }
        let r = rng.next_unit();
        self.settle(r)
    }

    /// Same as [`resolve`](Self::resolve) with an explicit draw `r` in `[0, 1)`.
    pub fn resolve_with_draw(&mut self, r: f64) -> ResolveOutcome {
        if let Some(outcome) = self.precheck() {
            return outcome;
        }
        self.settle(r)
    }

    /// Human-readable state, e.g. `<Tree collapsed at (3, 3)>`.
    pub fn description(&self) -> String {
        match self.state {
            ObjectState::Resolved(c) => format!("<{} collapsed at {}>", self.name, c),
            ObjectState::Unresolved => format!("<{} in superposition (uncollapsed)>", self.name),
        }
    }

    /// The distribution this object contributes when correlated with another.
    pub(crate) fn correlation_view(&self, policy: CorrelationPolicy) -> Cow<'_, Distribution> {
        match (self.state, policy) {
            (ObjectState::Resolved(c), CorrelationPolicy::PointMass) => {
                Cow::Owned(Distribution::point_mass(c))
            }
            _ => Cow::Borrowed(&self.distribution),
        }
    }

    /// Replaces the distribution after a successful interaction.
    pub(crate) fn replace_distribution(&mut self, distribution: Distribution) {
        self.distribution = distribution;
    }

    fn precheck(&mut self) -> Option<ResolveOutcome> {
        if let ObjectState::Resolved(c) = self.state {
            return Some(ResolveOutcome::AlreadyResolved(c));
        }

        self.normalize();
        if !self.distribution.is_viable() {
            debug!("{}: no viable outcome, staying unresolved", self.name);
            return Some(ResolveOutcome::NoViableOutcome);
        }

        None
    }

    fn settle(&mut self, r: f64) -> ResolveOutcome {
        match self.distribution.select(r) {
            Some(c) => {
                self.state = ObjectState::Resolved(c);
                debug!("{}: resolved at {} (draw={:.6})", self.name, c, r);
                ResolveOutcome::Resolved(c)
            }
            None => ResolveOutcome::NoViableOutcome,
        }
    }
}

impl fmt::Display for ProbabilisticObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
