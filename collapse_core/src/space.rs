//! The Space - container for probabilistic objects and their interactions.
//!
//! A [`Space`] holds shared handles to objects in insertion order. It drives
//! the two operations that change object state:
//!
//! - [`Space::interact`]: correlate two objects (keep only coincident cells,
//!   weighted by the product of both probabilities), then resolve both from
//!   one shared draw
//! - [`Space::resolve_all`]: resolve every held object independently
//!
//! Width and height describe the grid but are not enforced on distributions.

use crate::coordinate::Coordinate;
use crate::error::CollapseError;
use crate::object::{ResolveOutcome, SharedObject};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::debug;

/// How an already-resolved object takes part in an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationPolicy {
    /// A resolved object counts as weight 1.0 on its final cell only
    #[default]
    PointMass,

    /// A resolved object contributes whatever distribution it still stores,
    /// even though that no longer reflects its fixed position
    StoredDistribution,
}

impl CorrelationPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            CorrelationPolicy::PointMass => "point_mass",
            CorrelationPolicy::StoredDistribution => "stored_distribution",
        }
    }
}

/// What a call to `interact` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Both objects were already resolved; nothing changed
    BothResolved,

    /// No cell has positive weight on both sides; nothing changed
    NoOverlap,

    /// Distributions were replaced and both objects resolved
    Correlated { a: ResolveOutcome, b: ResolveOutcome },
}

impl InteractionOutcome {
    pub fn is_correlated(&self) -> bool {
        matches!(self, InteractionOutcome::Correlated { .. })
    }

    /// The shared cell, when both participants ended up on the same one.
    pub fn joint_coordinate(&self) -> Option<Coordinate> {
        match self {
            InteractionOutcome::Correlated { a, b } => match (a.coordinate(), b.coordinate()) {
                (Some(ca), Some(cb)) if ca == cb => Some(ca),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A rectangular grid holding shared handles to probabilistic objects.
#[derive(Debug)]
pub struct Space {
    width: i32,
    height: i32,
    objects: Vec<SharedObject>,
    policy: CorrelationPolicy,
}

impl Space {
    /// Creates an empty space. Dimensions are descriptive only.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            objects: Vec::new(),
            policy: CorrelationPolicy::default(),
        }
    }

    /// Creates an empty space, rejecting non-positive dimensions.
    pub fn try_new(width: i32, height: i32) -> Result<Self, CollapseError> {
        if width <= 0 || height <= 0 {
            return Err(CollapseError::InvalidDimensions { width, height });
        }
        Ok(Self::new(width, height))
    }

    /// Sets how resolved objects take part in later interactions.
    pub fn with_policy(mut self, policy: CorrelationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn policy(&self) -> CorrelationPolicy {
        self.policy
    }

    /// Appends an object. No deduplication, no bounds check.
    pub fn add_object(&mut self, object: SharedObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[SharedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of held objects that are resolved.
    pub fn resolved_count(&self) -> usize {
        self.objects.iter().filter(|o| o.borrow().is_resolved()).count()
    }

    /// State descriptions of all held objects, in order.
    pub fn descriptions(&self) -> Vec<String> {
        self.objects.iter().map(|o| o.borrow().description()).collect()
    }

    /// Correlates two objects and resolves both.
    ///
    /// Only cells with positive weight in both (normalized) distributions
    /// survive, each weighted by the product of the two probabilities. Both
    /// objects then take the combined distribution and resolve from a single
    /// draw, so two unresolved participants always land on the same cell.
    ///
    /// Leaves both objects untouched when both are already resolved or when
    /// their distributions do not overlap. Passing the same handle twice
    /// correlates the object with itself (weights squared) and resolves it.
    /// The objects need not be held by this space.
    pub fn interact<R: RandomSource + ?Sized>(
        &self,
        a: &SharedObject,
        b: &SharedObject,
        rng: &mut R,
    ) -> InteractionOutcome {
        if Rc::ptr_eq(a, b) {
            return self.interact_with_itself(a, rng);
        }

        let mut obj_a = a.borrow_mut();
        let mut obj_b = b.borrow_mut();

        if obj_a.is_resolved() && obj_b.is_resolved() {
            debug!("{} <-> {}: both already resolved", obj_a.name(), obj_b.name());
            return InteractionOutcome::BothResolved;
        }

        let mut view_a = obj_a.correlation_view(self.policy).into_owned();
        let mut view_b = obj_b.correlation_view(self.policy).into_owned();
        view_a.normalize();
        view_b.normalize();

        let (new_a, new_b) = view_a.combine(&view_b);
        if new_a.is_empty() || new_b.is_empty() {
            debug!("{} <-> {}: no overlap", obj_a.name(), obj_b.name());
            return InteractionOutcome::NoOverlap;
        }

        debug!(
            "{} <-> {}: {} coincident cell(s)",
            obj_a.name(),
            obj_b.name(),
            new_a.len()
        );

        obj_a.replace_distribution(new_a);
        obj_b.replace_distribution(new_b);

        let r = rng.next_unit();
        let outcome_a = obj_a.resolve_with_draw(r);
        let outcome_b = obj_b.resolve_with_draw(r);

        InteractionOutcome::Correlated {
            a: outcome_a,
            b: outcome_b,
        }
    }

    /// Same rules as `interact` for a single object on both sides.
    fn interact_with_itself<R: RandomSource + ?Sized>(
        &self,
        object: &SharedObject,
        rng: &mut R,
    ) -> InteractionOutcome {
        let mut obj = object.borrow_mut();

        if obj.is_resolved() {
            debug!("{} <-> itself: already resolved", obj.name());
            return InteractionOutcome::BothResolved;
        }

        let mut view = obj.correlation_view(self.policy).into_owned();
        view.normalize();

        let (combined, _) = view.combine(&view);
        if combined.is_empty() {
            debug!("{} <-> itself: no overlap", obj.name());
            return InteractionOutcome::NoOverlap;
        }

        debug!("{} <-> itself: {} cell(s)", obj.name(), combined.len());
        obj.replace_distribution(combined);

        let outcome = obj.resolve_with_draw(rng.next_unit());
        InteractionOutcome::Correlated {
            a: outcome,
            b: outcome,
        }
    }

    /// Resolves every held object in order.
    ///
    /// Returns how many objects were newly resolved by this call.
    pub fn resolve_all<R: RandomSource + ?Sized>(&self, rng: &mut R) -> usize {
        let mut newly_resolved = 0;

        for object in &self.objects {
            if object.borrow_mut().resolve(rng).is_newly_resolved() {
                newly_resolved += 1;
            }
        }

        debug!(
            "resolve_all: {} newly resolved, {}/{} resolved",
            newly_resolved,
            self.resolved_count(),
            self.len()
        );

        newly_resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use crate::object::{ObjectState, ProbabilisticObject};
    use crate::random::{ScriptedSource, SeededSource};
    use approx::assert_relative_eq;

    fn object(name: &str, dist: Distribution) -> SharedObject {
        ProbabilisticObject::new(name, dist).shared()
    }

    #[test]
    fn test_try_new_rejects_bad_dimensions() {
        assert_eq!(
            Space::try_new(0, 5).unwrap_err(),
            CollapseError::InvalidDimensions { width: 0, height: 5 }
        );
        assert!(Space::try_new(10, 10).is_ok());
    }

    #[test]
    fn test_add_object_keeps_order_and_duplicates() {
        let mut space = Space::new(2, 2);
        let a = object("Twin", Distribution::uniform(2, 2));
        let b = object("Twin", Distribution::uniform(2, 2));

        space.add_object(a.clone());
        space.add_object(b.clone());
        space.add_object(a.clone());

        assert_eq!(space.len(), 3);
        assert!(Rc::ptr_eq(&space.objects()[0], &a));
        assert!(Rc::ptr_eq(&space.objects()[1], &b));
    }

    #[test]
    fn test_interact_keeps_only_coincident_cell() {
        let space = Space::new(2, 2);
        let a = object("A", Distribution::from([((0, 0), 0.5), ((1, 1), 0.5)]));
        let b = object("B", Distribution::from([((1, 1), 1.0)]));

        let outcome = space.interact(&a, &b, &mut ScriptedSource::new([0.7]));

        assert_eq!(outcome.joint_coordinate(), Some(Coordinate::new(1, 1)));
        assert_eq!(a.borrow().distribution().len(), 1);
        assert_relative_eq!(b.borrow().distribution().weight(Coordinate::new(1, 1)), 1.0);
    }

    #[test]
    fn test_interact_forces_joint_resolution() {
        let space = Space::new(5, 5);
        let a = object("A", Distribution::uniform(5, 5));
        let b = object("B", Distribution::uniform(5, 5));

        let outcome = space.interact(&a, &b, &mut SeededSource::new(3));

        assert!(outcome.is_correlated());
        assert!(a.borrow().is_resolved());
        assert!(b.borrow().is_resolved());
        assert_eq!(a.borrow().final_coordinate(), b.borrow().final_coordinate());
    }

    #[test]
    fn test_interact_without_overlap_changes_nothing() {
        let space = Space::new(2, 2);
        let a = object("A", Distribution::from([((0, 0), 4.0)]));
        let b = object("B", Distribution::from([((1, 1), 1.0)]));
        let mut rng = ScriptedSource::new([0.5]);

        let outcome = space.interact(&a, &b, &mut rng);

        assert_eq!(outcome, InteractionOutcome::NoOverlap);
        assert_eq!(a.borrow().distribution(), &Distribution::from([((0, 0), 4.0)]));
        assert_eq!(b.borrow().distribution(), &Distribution::from([((1, 1), 1.0)]));
        assert_eq!(a.borrow().state(), ObjectState::Unresolved);
        assert_eq!(b.borrow().state(), ObjectState::Unresolved);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn test_interact_after_both_resolved_is_noop() {
        let space = Space::new(3, 3);
        let a = object("A", Distribution::from([((0, 0), 1.0)]));
        let b = object("B", Distribution::from([((2, 2), 1.0)]));
        a.borrow_mut().resolve_with_draw(0.1);
        b.borrow_mut().resolve_with_draw(0.1);

        let outcome = space.interact(&a, &b, &mut ScriptedSource::new([0.5]));

        assert_eq!(outcome, InteractionOutcome::BothResolved);
        assert_eq!(a.borrow().final_coordinate(), Some(Coordinate::new(0, 0)));
        assert_eq!(b.borrow().final_coordinate(), Some(Coordinate::new(2, 2)));
    }

    #[test]
    fn test_interact_with_itself_squares_and_resolves() {
        let space = Space::new(2, 2);
        let a = object("A", Distribution::from([((0, 0), 1.0), ((1, 1), 3.0)]));

        // Squared weights 1/16 and 9/16 renormalize to 0.1 and 0.9
        let outcome = space.interact(&a, &a, &mut ScriptedSource::new([0.15]));

        assert_eq!(
            outcome,
            InteractionOutcome::Correlated {
                a: ResolveOutcome::Resolved(Coordinate::new(1, 1)),
                b: ResolveOutcome::Resolved(Coordinate::new(1, 1)),
            }
        );
        assert!(a.borrow().is_resolved());
        assert_relative_eq!(a.borrow().distribution().weight(Coordinate::new(0, 0)), 0.1);
    }

    #[test]
    fn test_interact_uniform_with_itself_resolves() {
        let space = Space::new(2, 2);
        let a = object("A", Distribution::uniform(2, 2));

        let outcome = space.interact(&a, &a, &mut ScriptedSource::new([0.5]));

        assert_eq!(outcome.joint_coordinate(), a.borrow().final_coordinate());
        assert!(a.borrow().is_resolved());
    }

    #[test]
    fn test_interact_with_itself_degenerate_cases() {
        let space = Space::new(2, 2);
        let void = object("Void", Distribution::new());
        let mut rng = ScriptedSource::new([0.5]);

        assert_eq!(space.interact(&void, &void, &mut rng), InteractionOutcome::NoOverlap);
        assert_eq!(rng.consumed(), 0);

        let done = object("Done", Distribution::from([((1, 0), 1.0)]));
        done.borrow_mut().resolve_with_draw(0.5);
        assert_eq!(space.interact(&done, &done, &mut rng), InteractionOutcome::BothResolved);
        assert_eq!(done.borrow().final_coordinate(), Some(Coordinate::new(1, 0)));
    }

    #[test]
    fn test_point_mass_policy_pins_partner_to_resolved_cell() {
        let space = Space::new(3, 3);
        let anchor = object("Anchor", Distribution::from([((0, 0), 0.5), ((2, 2), 0.5)]));
        let probe = object("Probe", Distribution::uniform(3, 3));
        anchor.borrow_mut().resolve_with_draw(0.9);

        // Any draw lands on the anchor's cell: it is the only survivor
        let outcome = space.interact(&probe, &anchor, &mut ScriptedSource::new([0.0]));

        assert_eq!(outcome.joint_coordinate(), Some(Coordinate::new(2, 2)));
        assert_eq!(probe.borrow().final_coordinate(), Some(Coordinate::new(2, 2)));
    }

    #[test]
    fn test_point_mass_policy_no_overlap_with_resolved_cell() {
        let space = Space::new(3, 3);
        let anchor = object("Anchor", Distribution::from([((0, 0), 1.0)]));
        let probe = object("Probe", Distribution::from([((1, 1), 1.0)]));
        anchor.borrow_mut().resolve_with_draw(0.5);

        let outcome = space.interact(&probe, &anchor, &mut ScriptedSource::new([0.5]));

        assert_eq!(outcome, InteractionOutcome::NoOverlap);
        assert!(!probe.borrow().is_resolved());
    }

    #[test]
    fn test_stored_policy_uses_stale_distribution() {
        let space = Space::new(3, 3).with_policy(CorrelationPolicy::StoredDistribution);
        assert_eq!(space.policy(), CorrelationPolicy::StoredDistribution);
        let anchor = object("Anchor", Distribution::from([((0, 0), 0.5), ((2, 2), 0.5)]));
        let probe = object("Probe", Distribution::uniform(3, 3));
        anchor.borrow_mut().resolve_with_draw(0.9);

        // Stale view keeps (0, 0) alive, so a low draw picks it
        let outcome = space.interact(&probe, &anchor, &mut ScriptedSource::new([0.0]));

        assert_eq!(
            outcome,
            InteractionOutcome::Correlated {
                a: ResolveOutcome::Resolved(Coordinate::new(0, 0)),
                b: ResolveOutcome::AlreadyResolved(Coordinate::new(2, 2)),
            }
        );
        assert_eq!(outcome.joint_coordinate(), None);
    }

    #[test]
    fn test_resolve_all_covers_every_object() {
        let mut space = Space::new(4, 4);
        for name in ["A", "B", "C"] {
            space.add_object(object(name, Distribution::uniform(4, 4)));
        }

        let newly = space.resolve_all(&mut SeededSource::new(11));

        assert_eq!(newly, 3);
        assert_eq!(space.resolved_count(), 3);
        assert!(space.objects().iter().all(|o| o.borrow().is_resolved()));
    }

    #[test]
    fn test_resolve_all_skips_degenerate_objects() {
        let mut space = Space::new(4, 4);
        space.add_object(object("Solid", Distribution::uniform(4, 4)));
        space.add_object(object("Void", Distribution::new()));

        let newly = space.resolve_all(&mut ScriptedSource::new([0.5, 0.5]));

        assert_eq!(newly, 1);
        assert_eq!(
            space.descriptions(),
            vec![
                "<Solid collapsed at (1, 3)>".to_string(),
                "<Void in superposition (uncollapsed)>".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_all_is_idempotent() {
        let mut space = Space::new(2, 2);
        space.add_object(object("A", Distribution::uniform(2, 2)));
        let mut rng = SeededSource::new(5);

        space.resolve_all(&mut rng);
        let before = space.descriptions();
        assert_eq!(space.resolve_all(&mut rng), 0);
        assert_eq!(space.descriptions(), before);
    }
}
