use crate::{Direction, Grid, NavigationTable, PathFinder, Point};

/// "Which way next, and how far" queries on a static board.
///
/// Implemented by live search ([`PathFinder`]) and by precomputed tables
/// ([`NavigationTable`]); [`Navigation`] picks whichever is available.
pub trait Navigator {
    /// First step from `start` toward `end`, or [`Direction::Nowhere`] when already there or
    /// when `end` cannot be reached.
    fn next_direction(&self, start: Point, end: Point) -> Direction;

    /// Number of steps on a shortest path, `Some(0)` when `start == end`, `None` when
    /// unreachable.
    fn path_distance(&self, start: Point, end: Point) -> Option<u32>;
}

impl Navigator for PathFinder<'_> {
    fn next_direction(&self, start: Point, end: Point) -> Direction {
        self.find_path(start, end)
            .and_then(|path| path.first().copied())
            .and_then(|step| self.grid().direction_between(start, step))
            .unwrap_or(Direction::Nowhere)
    }

    fn path_distance(&self, start: Point, end: Point) -> Option<u32> {
        if self.grid().wrap(start) == self.grid().wrap(end) {
            return Some(0);
        }
        self.find_path(start, end).map(|path| path.len() as u32)
    }
}

impl Navigator for NavigationTable {
    fn next_direction(&self, start: Point, end: Point) -> Direction {
        NavigationTable::next_direction(self, start, end)
    }

    fn path_distance(&self, start: Point, end: Point) -> Option<u32> {
        if NavigationTable::next_direction(self, start, end) != Direction::Nowhere {
            return Some(self.distance(start, end));
        }
        // "Nowhere" is either arrival or an unreachable pair.
        let (w, h) = self.dimensions();
        let same_cell = start.x.rem_euclid(w as i32) == end.x.rem_euclid(w as i32)
            && start.y.rem_euclid(h as i32) == end.y.rem_euclid(h as i32);
        same_cell.then_some(0)
    }
}

/// Table-backed navigation when a table for this board is available, live A* otherwise.
///
/// The table is purely an accelerator: both variants answer the same questions.
#[derive(Debug, Clone, Copy)]
pub enum Navigation<'a> {
    Live(PathFinder<'a>),
    Cached {
        grid: &'a Grid,
        table: &'a NavigationTable,
    },
}

impl<'a> Navigation<'a> {
    /// Uses `table` only when it was generated for a board of `grid`'s size.
    pub fn select(grid: &'a Grid, table: Option<&'a NavigationTable>) -> Self {
        match table {
            Some(table) if table.covers(grid) => Self::Cached { grid, table },
            _ => Self::Live(PathFinder::new(grid)),
        }
    }

    pub fn grid(&self) -> &'a Grid {
        match self {
            Self::Live(finder) => finder.grid(),
            Self::Cached { grid, .. } => *grid,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }

    /// Next point toward `end`; `start` itself when there is no path.
    pub fn next_point(&self, start: Point, end: Point) -> Point {
        let grid = self.grid();
        grid.step(grid.wrap(start), self.next_direction(start, end))
    }
}

impl Navigator for Navigation<'_> {
    fn next_direction(&self, start: Point, end: Point) -> Direction {
        match self {
            Self::Live(finder) => finder.next_direction(start, end),
            Self::Cached { table, .. } => Navigator::next_direction(*table, start, end),
        }
    }

    fn path_distance(&self, start: Point, end: Point) -> Option<u32> {
        match self {
            Self::Live(finder) => finder.path_distance(start, end),
            Self::Cached { table, .. } => table.path_distance(start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_navigation_reports_unreachable_as_nowhere() {
        let mut grid = Grid::open(3, 3);
        grid.set_wall(Point::new(1, 1), true);
        let nav = Navigation::select(&grid, None);
        assert!(!nav.is_cached());
        assert_eq!(nav.next_direction(Point::new(0, 0), Point::new(1, 1)), Direction::Nowhere);
        assert_eq!(nav.path_distance(Point::new(0, 0), Point::new(1, 1)), None);
        assert_eq!(nav.next_point(Point::new(0, 0), Point::new(1, 1)), Point::new(0, 0));
    }

    #[test]
    fn live_distance_counts_steps() {
        let grid = Grid::open(19, 19);
        let nav = Navigation::select(&grid, None);
        assert_eq!(nav.path_distance(Point::new(0, 0), Point::new(0, 0)), Some(0));
        assert_eq!(nav.path_distance(Point::new(0, 0), Point::new(18, 17)), Some(3));
    }
}
