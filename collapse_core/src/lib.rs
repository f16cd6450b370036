//! Collapse Core - Discrete Probabilistic Objects on a Grid
//!
//! Objects start out "in superposition": a weighted distribution over grid
//! cells. They settle on a single cell in one of two ways:
//! 1. **Resolution**: a weighted random draw from the object's own distribution
//! 2. **Interaction**: two objects are correlated (only coincident cells
//!    survive) and then resolved together from a single shared draw
//!
//! All randomness flows through an injected [`RandomSource`], so any run is
//! reproducible from its seed (or a scripted list of draws in tests).
//!
//! # Example
//!
//! ```
//! use collapse_core::{Distribution, ProbabilisticObject, SeededSource, Space};
//!
//! let mut space = Space::new(4, 4);
//! let tree = ProbabilisticObject::new("Tree", Distribution::uniform(4, 4)).shared();
//! let john = ProbabilisticObject::new("John", Distribution::uniform(4, 4)).shared();
//! space.add_object(tree.clone());
//! space.add_object(john.clone());
//!
//! let mut rng = SeededSource::new(42);
//! space.interact(&john, &tree, &mut rng);
//!
//! assert_eq!(tree.borrow().final_coordinate(), john.borrow().final_coordinate());
//! ```

pub mod coordinate;
pub mod distribution;
pub mod error;
pub mod object;
pub mod random;
pub mod space;

// Re-export key types for convenience
pub use coordinate::Coordinate;
pub use distribution::Distribution;
pub use error::CollapseError;
pub use object::{ObjectState, ProbabilisticObject, ResolveOutcome, SharedObject};
pub use random::{RandomSource, ScriptedSource, SeededSource};
pub use space::{CorrelationPolicy, InteractionOutcome, Space};
