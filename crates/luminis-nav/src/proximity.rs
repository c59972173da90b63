//! Breadth-first "nearest point matching a predicate" queries.

use std::collections::VecDeque;

use crate::{Grid, Point};

#[derive(Debug, Clone, Copy)]
pub struct ProximitySearch<'g> {
    grid: &'g Grid,
}

impl<'g> ProximitySearch<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    /// Closest point to `source`, by walking distance around walls, for which `predicate` holds.
    ///
    /// `source` itself is tested first; callers that must not match the source exclude it in
    /// the predicate. Points at equal depth are tested in the board's direction order, so ties
    /// resolve deterministically. Walls are never visited.
    pub fn closest_point<F>(&self, source: Point, mut predicate: F) -> Option<Point>
    where
        F: FnMut(Point) -> bool,
    {
        let grid = self.grid;
        let source = grid.wrap(source);

        let mut visited = vec![false; grid.len()];
        let mut queue = VecDeque::new();
        visited[grid.index(source)] = true;
        queue.push_back(source);

        while let Some(cursor) = queue.pop_front() {
            if predicate(cursor) {
                return Some(cursor);
            }

            for (_, n) in grid.open_neighbors(cursor) {
                let idx = grid.index(n);
                if visited[idx] {
                    continue;
                }
                visited[idx] = true;
                queue.push_back(n);
            }
        }

        None
    }

    /// Walking distance from `source` to every point of the board.
    pub fn distance_field(&self, source: Point) -> DistanceField<'g> {
        let grid = self.grid;
        let source = grid.wrap(source);
        let mut distances = vec![None; grid.len()];
        let mut queue = VecDeque::new();

        if !grid.is_wall(source) {
            distances[grid.index(source)] = Some(0u32);
            queue.push_back(source);
        }

        while let Some(cursor) = queue.pop_front() {
            let Some(d) = distances[grid.index(cursor)] else {
                continue;
            };
            for (_, n) in grid.open_neighbors(cursor) {
                let idx = grid.index(n);
                if distances[idx].is_none() {
                    distances[idx] = Some(d + 1);
                    queue.push_back(n);
                }
            }
        }

        DistanceField { grid, distances }
    }
}

/// Result of [`ProximitySearch::distance_field`].
#[derive(Debug, Clone)]
pub struct DistanceField<'g> {
    grid: &'g Grid,
    distances: Vec<Option<u32>>,
}

impl DistanceField<'_> {
    /// `None` for walls and unreachable points.
    pub fn get(&self, point: Point) -> Option<u32> {
        self.distances[self.grid.index(point)]
    }
}
