//! Spatial hash over ground-plane points, used for clearance checks while
//! placing static content.

use bevy::math::DVec2;
use std::collections::HashMap;

/// Bucketed set of occupied footprints.
#[derive(Clone, Debug, Default)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i32, i32), Vec<DVec2>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    /// Convert a ground position to cell coordinates.
    pub fn to_cell(&self, pos: DVec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, pos: DVec2) {
        let cell = self.to_cell(pos);
        self.cells.entry(cell).or_default().push(pos);
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }

    /// True if any stored point lies strictly within `radius` of `center`.
    pub fn any_within(&self, center: DVec2, radius: f64) -> bool {
        let min_cell = self.to_cell(center - DVec2::splat(radius));
        let max_cell = self.to_cell(center + DVec2::splat(radius));

        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                let Some(points) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                if points.iter().any(|p| p.distance(center) < radius) {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_neighbors_across_cell_borders() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(DVec2::new(9.5, 0.0));
        assert!(grid.any_within(DVec2::new(10.5, 0.0), 2.0));
        assert!(!grid.any_within(DVec2::new(12.0, 0.0), 2.0));
        assert!(grid.any_within(DVec2::new(-5.0, 3.0), 15.0));
        assert_eq!(grid.len(), 1);
    }
}
