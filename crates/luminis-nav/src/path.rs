//! A* shortest paths on the torus.

use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::{Grid, Point};

#[derive(Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    idx: usize,
    cell: Point,
    seq: u64,
}

impl OpenNode {
    // Equal priorities pop in insertion order.
    fn key(&self) -> (u32, u64) {
        (self.f, self.seq)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

/// Live A* search over a [`Grid`].
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    grid: &'g Grid,
}

impl<'g> PathFinder<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn find_path(&self, start: Point, end: Point) -> Option<Vec<Point>> {
        self.find_path_avoiding(start, end, &HashSet::new())
    }

    /// Shortest path from `start` to `end` that never steps on a wall or on a point in `avoid`.
    ///
    /// The returned points run from the step after `start` up to and including `end`, so the
    /// first element is the next move. `start == end` yields `[end]`. Returns `None` when either
    /// endpoint is a wall or `end` cannot be reached.
    pub fn find_path_avoiding(
        &self,
        start: Point,
        end: Point,
        avoid: &HashSet<Point>,
    ) -> Option<Vec<Point>> {
        let grid = self.grid;
        let start = grid.wrap(start);
        let end = grid.wrap(end);
        let avoid: HashSet<Point> = avoid.iter().map(|&p| grid.wrap(p)).collect();

        if start == end {
            return Some(vec![end]);
        }
        if grid.is_wall(start) || grid.is_wall(end) {
            return None;
        }

        let start_idx = grid.index(start);
        let end_idx = grid.index(end);

        let mut open = BinaryHeap::<OpenNode>::new();
        let mut seq: u64 = 0;

        let mut g_score = vec![u32::MAX; grid.len()];
        let mut came_from: Vec<Option<usize>> = vec![None; grid.len()];

        g_score[start_idx] = 0;
        open.push(OpenNode {
            f: grid.distance(start, end),
            g: 0,
            idx: start_idx,
            cell: start,
            seq,
        });
        seq += 1;

        while let Some(node) = open.pop() {
            if node.idx == end_idx {
                return Some(reconstruct_path(grid, &came_from, start_idx, end_idx));
            }

            if node.g != g_score[node.idx] {
                // Stale heap entry; a cheaper route to this cell was queued later.
                continue;
            }

            for (_, n) in grid.neighbors(node.cell) {
                if grid.is_wall(n) || avoid.contains(&n) {
                    continue;
                }
                let n_idx = grid.index(n);

                let tentative_g = node.g.saturating_add(1);
                if tentative_g >= g_score[n_idx] {
                    continue;
                }

                came_from[n_idx] = Some(node.idx);
                g_score[n_idx] = tentative_g;
                open.push(OpenNode {
                    f: tentative_g.saturating_add(grid.distance(n, end)),
                    g: tentative_g,
                    idx: n_idx,
                    cell: n,
                    seq,
                });
                seq += 1;
            }
        }

        None
    }
}

fn reconstruct_path(
    grid: &Grid,
    came_from: &[Option<usize>],
    start_idx: usize,
    end_idx: usize,
) -> Vec<Point> {
    let mut out = Vec::new();
    let mut current = end_idx;
    while current != start_idx {
        out.push(grid.cell_from_index(current));
        match came_from[current] {
            Some(prev) => current = prev,
            None => break,
        }
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_node_orders_by_priority_then_insertion() {
        let mut heap = BinaryHeap::new();
        for (f, seq) in [(3, 0), (2, 1), (2, 2), (1, 3)] {
            heap.push(OpenNode {
                f,
                g: 0,
                idx: 0,
                cell: Point::default(),
                seq,
            });
        }
        let popped: Vec<_> = std::iter::from_fn(|| heap.pop().map(|n| n.seq)).collect();
        assert_eq!(popped, vec![3, 1, 2, 0]);
    }

    #[test]
    fn path_wraps_across_the_edge() {
        let grid = Grid::open(10, 10);
        let path = PathFinder::new(&grid)
            .find_path(Point::new(0, 0), Point::new(9, 0))
            .expect("path");
        assert_eq!(path, vec![Point::new(9, 0)]);
    }

    #[test]
    fn avoided_end_is_unreachable() {
        let grid = Grid::open(5, 5);
        let avoid: HashSet<_> = [Point::new(2, 2)].into_iter().collect();
        let path =
            PathFinder::new(&grid).find_path_avoiding(Point::new(0, 0), Point::new(2, 2), &avoid);
        assert_eq!(path, None);
    }

    #[test]
    fn wall_start_has_no_path() {
        let mut grid = Grid::open(5, 5);
        grid.set_wall(Point::new(1, 1), true);
        assert_eq!(
            PathFinder::new(&grid).find_path(Point::new(1, 1), Point::new(3, 3)),
            None
        );
    }
}
