//! Wrapping (toroidal) wall grid and the canonical neighbour order.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Unwrapped step; callers go through [`Grid::step`] to stay on the board.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement directions. `Nowhere` means "stay" / "already arrived".
///
/// The discriminants double as the direction codes of the navigation table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Direction {
    #[default]
    Nowhere = 0,
    North = 1,
    East = 2,
    South = 3,
    West = 4,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Nowhere => (0, 0),
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Nowhere),
            1 => Some(Self::North),
            2 => Some(Self::East),
            3 => Some(Self::South),
            4 => Some(Self::West),
            _ => None,
        }
    }

    /// Wire token used by the match server.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nowhere => "NOWHERE",
            Self::North => "NORTH",
            Self::East => "EAST",
            Self::South => "SOUTH",
            Self::West => "WEST",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NOWHERE" => Some(Self::Nowhere),
            "NORTH" => Some(Self::North),
            "EAST" => Some(Self::East),
            "SOUTH" => Some(Self::South),
            "WEST" => Some(Self::West),
            _ => None,
        }
    }
}

/// Order in which neighbours are enumerated.
///
/// Search tie-breaks follow this order, so two clients that disagree on it will pick different
/// (equally short) paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DirectionOrder([Direction; 4]);

impl Default for DirectionOrder {
    fn default() -> Self {
        Self(Direction::CARDINAL)
    }
}

impl DirectionOrder {
    /// Returns `None` unless `order` is a permutation of the four cardinal directions.
    pub fn new(order: [Direction; 4]) -> Option<Self> {
        let is_permutation = Direction::CARDINAL
            .iter()
            .all(|d| order.iter().filter(|o| *o == d).count() == 1);
        is_permutation.then_some(Self(order))
    }

    pub fn as_slice(&self) -> &[Direction; 4] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.0.iter().copied()
    }
}

/// Per-axis wrap-aware distance.
fn axis_distance(a: i32, b: i32, length: i32) -> u32 {
    let inner = (a - b).rem_euclid(length);
    inner.min(length - inner) as u32
}

/// Manhattan distance on a `width` x `height` torus.
///
/// This is the exact cost of an unobstructed walk, which makes it an admissible and consistent
/// A* heuristic.
pub fn toroidal_distance(p: Point, q: Point, width: i32, height: i32) -> u32 {
    axis_distance(p.x, q.x, width) + axis_distance(p.y, q.y, height)
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridRepr"))]
pub struct Grid {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    order: DirectionOrder,
}

/// Unchecked serialized form; [`Grid`] is only built from it once the sizes agree.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct GridRepr {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    order: DirectionOrder,
}

#[cfg(feature = "serde")]
impl TryFrom<GridRepr> for Grid {
    type Error = String;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        if repr.width <= 0 || repr.height <= 0 {
            return Err(format!(
                "grid must be non-empty, got {}x{}",
                repr.width, repr.height
            ));
        }
        let cells = (repr.width as usize) * (repr.height as usize);
        if repr.walls.len() != cells {
            return Err(format!(
                "{}x{} grid needs {cells} wall flags, got {}",
                repr.width,
                repr.height,
                repr.walls.len()
            ));
        }
        Ok(Self {
            width: repr.width,
            height: repr.height,
            walls: repr.walls,
            order: repr.order,
        })
    }
}

impl Grid {
    /// Wall-free board.
    pub fn open(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "grid must be non-empty");
        assert!(
            width <= i32::MAX as u32 && height <= i32::MAX as u32,
            "grid dimensions must fit in i32"
        );
        let width = width as i32;
        let height = height as i32;
        Self {
            width,
            height,
            walls: vec![false; (width as usize) * (height as usize)],
            order: DirectionOrder::default(),
        }
    }

    /// Builds a board from column-major wall flags (`columns[x][y]`), the layout the match
    /// server uses. Returns `None` for an empty or ragged matrix.
    pub fn from_columns(columns: &[Vec<bool>]) -> Option<Self> {
        let width = u32::try_from(columns.len()).ok()?;
        let height = u32::try_from(columns.first()?.len()).ok()?;
        if width == 0 || height == 0 || columns.iter().any(|c| c.len() != height as usize) {
            return None;
        }

        let mut grid = Self::open(width, height);
        for (x, column) in columns.iter().enumerate() {
            for (y, &wall) in column.iter().enumerate() {
                grid.set_wall(Point::new(x as i32, y as i32), wall);
            }
        }
        Some(grid)
    }

    pub fn with_direction_order(mut self, order: DirectionOrder) -> Self {
        self.order = order;
        self
    }

    pub fn set_direction_order(&mut self, order: DirectionOrder) {
        self.order = order;
    }

    pub fn direction_order(&self) -> DirectionOrder {
        self.order
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells on the board.
    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn set_wall(&mut self, point: Point, wall: bool) {
        let idx = self.index(point);
        self.walls[idx] = wall;
    }

    pub fn wrap(&self, point: Point) -> Point {
        Point::new(
            point.x.rem_euclid(self.width),
            point.y.rem_euclid(self.height),
        )
    }

    pub fn is_within_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width && point.y < self.height
    }

    /// True for in-bounds points on the outer ring of the board.
    pub fn at_edge(&self, point: Point) -> bool {
        self.is_within_bounds(point)
            && (point.x == 0
                || point.y == 0
                || point.x == self.width - 1
                || point.y == self.height - 1)
    }

    pub fn is_wall(&self, point: Point) -> bool {
        self.walls[self.index(point)]
    }

    pub fn distance(&self, p: Point, q: Point) -> u32 {
        toroidal_distance(p, q, self.width, self.height)
    }

    pub fn step(&self, point: Point, direction: Direction) -> Point {
        self.wrap(point.offset(direction))
    }

    /// The four wrapped neighbours, in the board's direction order.
    pub fn neighbors(&self, point: Point) -> [(Direction, Point); 4] {
        self.order.0.map(|d| (d, self.step(point, d)))
    }

    /// Neighbours that are not walls, in the board's direction order.
    pub fn open_neighbors(&self, point: Point) -> impl Iterator<Item = (Direction, Point)> + '_ {
        self.neighbors(point)
            .into_iter()
            .filter(|(_, p)| !self.is_wall(*p))
    }

    /// Direction that takes `from` onto the adjacent point `to`, if they are adjacent.
    pub fn direction_between(&self, from: Point, to: Point) -> Option<Direction> {
        let to = self.wrap(to);
        self.neighbors(from)
            .into_iter()
            .find(|(_, p)| *p == to)
            .map(|(d, _)| d)
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Point::new(x, y)))
    }

    pub(crate) fn index(&self, point: Point) -> usize {
        let p = self.wrap(point);
        (p.y * self.width + p.x) as usize
    }

    pub(crate) fn cell_from_index(&self, idx: usize) -> Point {
        let idx = idx as i32;
        Point::new(idx % self.width, idx / self.width)
    }
}
