//! Scenario setup - builds the populated [`Space`] for each scenario.
//!
//! Shapes start from a uniform grid and are sharpened with a Gaussian
//! factor `exp(-0.5 * r^2)` around a center cell.

use crate::config::SimConfig;
use crate::error::SimError;
use collapse_core::{Coordinate, Distribution, ProbabilisticObject, SharedObject, Space};

/// Gaussian weight `exp(-0.5 * r^2)`, where `r` is the cell distance to `center`.
pub fn gauss_factor(cell: Coordinate, center: Coordinate) -> f64 {
    (-0.5 * cell.distance_squared(center) as f64).exp()
}

/// Uniform grid distribution sharpened around `center`.
pub fn gaussian(width: i32, height: i32, center: Coordinate) -> Distribution {
    let mut dist = Distribution::uniform(width, height);
    dist.scale_by(|cell| gauss_factor(cell, center));
    dist
}

/// Looks up the first object in the space with the given name.
pub fn find(space: &Space, name: &str) -> Option<SharedObject> {
    space
        .objects()
        .iter()
        .find(|o| o.borrow().name() == name)
        .cloned()
}

fn space_for(config: &SimConfig) -> Result<Space, SimError> {
    Ok(Space::try_new(config.width, config.height)?.with_policy(config.policy))
}

fn add(space: &mut Space, name: &str, dist: Distribution) {
    space.add_object(ProbabilisticObject::new(name, dist).shared());
}

/// Tree planted around (3, 3), John standing around (2, 3), Observer1 anywhere.
pub fn planting(config: &SimConfig) -> Result<Space, SimError> {
    let mut space = space_for(config)?;
    let (w, h) = (config.width, config.height);

    add(&mut space, "Tree", gaussian(w, h, Coordinate::new(3, 3)));
    add(&mut space, "John", gaussian(w, h, Coordinate::new(2, 3)));
    add(&mut space, "Observer1", Distribution::uniform(w, h));

    Ok(space)
}

/// Left confined to the left half of the grid, Right to the right half.
pub fn disjoint(config: &SimConfig) -> Result<Space, SimError> {
    let mut space = space_for(config)?;
    let split = config.width / 2;

    let grid = Distribution::uniform(config.width, config.height);
    let left: Distribution = grid.iter().filter(|(cell, _)| cell.x < split).collect();
    let right: Distribution = grid.iter().filter(|(cell, _)| cell.x >= split).collect();

    add(&mut space, "Left", left);
    add(&mut space, "Right", right);

    Ok(space)
}

/// One object peaked at each corner of the grid plus one at the center.
pub fn independent(config: &SimConfig) -> Result<Space, SimError> {
    let mut space = space_for(config)?;
    let (w, h) = (config.width, config.height);

    let peaks = [
        ("NorthWest", Coordinate::new(0, 0)),
        ("NorthEast", Coordinate::new(w - 1, 0)),
        ("SouthWest", Coordinate::new(0, h - 1)),
        ("SouthEast", Coordinate::new(w - 1, h - 1)),
        ("Center", Coordinate::new(w / 2, h / 2)),
    ];
    for (name, center) in peaks {
        add(&mut space, name, gaussian(w, h, center));
    }

    Ok(space)
}

/// Void has no cells, Ghost has only zero weights, Anchor is uniform.
pub fn vacuum(config: &SimConfig) -> Result<Space, SimError> {
    let mut space = space_for(config)?;
    let (w, h) = (config.width, config.height);

    let mut ghost = Distribution::uniform(w, h);
    ghost.scale_by(|_| 0.0);

    add(&mut space, "Void", Distribution::new());
    add(&mut space, "Ghost", ghost);
    add(&mut space, "Anchor", Distribution::uniform(w, h));

    Ok(space)
}
