//! The per-turn world snapshot handed to decision routines.
//!
//! A [`World`] is built fresh for every turn and never shared between turns. Lookup maps and
//! nest clusters are built on first use and live exactly as long as the snapshot.

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use luminis_nav::{
    ClusterFinder, Direction, Grid, Navigation, NavigationTable, Navigator, NestCluster,
    PathFinder, Point, ProximitySearch,
};
use thiserror::Error;

use crate::entities::{Intent, MoveType, Tile, Unit};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("asked to move unit {0}, which is no longer in the game")]
    UnknownUnit(String),
}

/// Static, match-long board state: the wall grid and the optional navigation table for it.
///
/// Cheap to clone; every turn's [`World`] gets its own handle.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Arc<Grid>,
    navigation: Option<Arc<NavigationTable>>,
}

impl Board {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid: Arc::new(grid),
            navigation: None,
        }
    }

    /// Attaches `table` if it was generated for this board; otherwise logs and keeps using live
    /// search.
    pub fn with_navigation(mut self, table: Arc<NavigationTable>) -> Self {
        if table.covers(&self.grid) {
            self.navigation = Some(table);
        } else {
            let (width, height) = table.dimensions();
            tracing::warn!(
                table_width = width,
                table_height = height,
                board_width = self.grid.width(),
                board_height = self.grid.height(),
                "Navigation cache does not match the board; path-finding may be slow"
            );
        }
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn navigation_table(&self) -> Option<&NavigationTable> {
        self.navigation.as_deref()
    }
}

/// Per-turn snapshot of the game, as seen by the local player.
#[derive(Debug)]
pub struct World {
    board: Board,
    friendlies: Vec<Unit>,
    enemies: Vec<Unit>,
    friendly_tiles: Vec<Tile>,
    enemy_tiles: Vec<Tile>,
    neutral_tiles: Vec<Tile>,
    friendly_nests: Vec<Point>,
    enemy_nests: Vec<Point>,

    friendly_index: OnceCell<HashMap<Point, usize>>,
    enemy_index: OnceCell<HashMap<Point, usize>>,
    uuid_index: OnceCell<HashMap<String, usize>>,
    tile_index: OnceCell<HashMap<Point, Tile>>,
    friendly_clusters: OnceCell<Vec<NestCluster>>,
    enemy_clusters: OnceCell<Vec<NestCluster>>,
}

/// Per-team ownership for a [`World`]: tiles and nest positions.
#[derive(Debug, Clone, Default)]
pub struct Holdings {
    pub tiles: Vec<Tile>,
    pub nests: Vec<Point>,
}

impl World {
    /// Builds a snapshot. Units are sorted by ascending health; every open position that is
    /// neither friendly nor enemy becomes a neutral tile.
    pub fn new(
        board: Board,
        mut friendlies: Vec<Unit>,
        mut enemies: Vec<Unit>,
        friendly: Holdings,
        enemy: Holdings,
    ) -> Self {
        friendlies.sort_by_key(|u| u.health);
        enemies.sort_by_key(|u| u.health);

        let owned: HashSet<Point> = friendly
            .tiles
            .iter()
            .chain(enemy.tiles.iter())
            .map(|t| t.position)
            .collect();
        let grid = board.grid();
        let neutral_tiles = grid
            .points()
            .filter(|p| !grid.is_wall(*p) && !owned.contains(p))
            .map(Tile::neutral)
            .collect();

        Self {
            board,
            friendlies,
            enemies,
            friendly_tiles: friendly.tiles,
            enemy_tiles: enemy.tiles,
            neutral_tiles,
            friendly_nests: friendly.nests,
            enemy_nests: enemy.nests,
            friendly_index: OnceCell::new(),
            enemy_index: OnceCell::new(),
            uuid_index: OnceCell::new(),
            tile_index: OnceCell::new(),
            friendly_clusters: OnceCell::new(),
            enemy_clusters: OnceCell::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> &Grid {
        self.board.grid()
    }

    // Board geometry

    pub fn width(&self) -> i32 {
        self.grid().width()
    }

    pub fn height(&self) -> i32 {
        self.grid().height()
    }

    /// Wrap-aware Manhattan distance, ignoring walls.
    pub fn taxicab_distance(&self, start: Point, end: Point) -> u32 {
        self.grid().distance(start, end)
    }

    pub fn is_within_bounds(&self, point: Point) -> bool {
        self.grid().is_within_bounds(point)
    }

    pub fn is_wall(&self, point: Point) -> bool {
        self.grid().is_wall(point)
    }

    pub fn at_edge(&self, point: Point) -> bool {
        self.grid().at_edge(point)
    }

    pub fn neighbours(&self, point: Point) -> [(Direction, Point); 4] {
        self.grid().neighbors(point)
    }

    // Navigation

    /// Cache-backed navigation when a table is attached, live A* otherwise.
    pub fn navigation(&self) -> Navigation<'_> {
        Navigation::select(self.grid(), self.board.navigation_table())
    }

    /// Live A* path that also treats `avoid` as impassable. See [`PathFinder::find_path_avoiding`].
    pub fn shortest_path(
        &self,
        start: Point,
        end: Point,
        avoid: &HashSet<Point>,
    ) -> Option<Vec<Point>> {
        PathFinder::new(self.grid()).find_path_avoiding(start, end, avoid)
    }

    /// First step toward `end`, or `start` when there is no path.
    ///
    /// Only walls are taken into account; units and nests in the way are not.
    pub fn next_point_in_shortest_path(&self, start: Point, end: Point) -> Point {
        self.navigation().next_point(start, end)
    }

    /// `Some(0)` when `start == end`, `None` when unreachable.
    pub fn shortest_path_distance(&self, start: Point, end: Point) -> Option<u32> {
        self.navigation().path_distance(start, end)
    }

    // Proximity

    /// Closest point to `source` by walking distance for which `condition` holds. `source`
    /// itself is a candidate.
    pub fn closest_point_from<F>(&self, source: Point, condition: F) -> Option<Point>
    where
        F: FnMut(Point) -> bool,
    {
        ProximitySearch::new(self.grid()).closest_point(source, condition)
    }

    pub fn closest_enemy_from(&self, point: Point, excluding: &HashSet<Point>) -> Option<&Unit> {
        let index = self.enemy_index();
        let excluding = self.wrap_all(excluding);
        let found =
            self.closest_point_from(point, |p| index.contains_key(&p) && !excluding.contains(&p))?;
        self.enemy_at(found)
    }

    pub fn closest_friendly_from(&self, point: Point, excluding: &HashSet<Point>) -> Option<&Unit> {
        let index = self.friendly_index();
        let excluding = self.wrap_all(excluding);
        let found =
            self.closest_point_from(point, |p| index.contains_key(&p) && !excluding.contains(&p))?;
        self.friendly_at(found)
    }

    pub fn closest_neutral_tile_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
    ) -> Option<&Tile> {
        self.closest_tile_from(point, excluding, Tile::is_neutral)
    }

    pub fn closest_enemy_tile_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
    ) -> Option<&Tile> {
        self.closest_tile_from(point, excluding, Tile::is_enemy)
    }

    pub fn closest_friendly_tile_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
    ) -> Option<&Tile> {
        self.closest_tile_from(point, excluding, Tile::is_friendly)
    }

    /// Closest neutral or non-permanent enemy tile.
    pub fn closest_capturable_tile_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
    ) -> Option<&Tile> {
        self.closest_tile_from(point, excluding, Tile::is_capturable)
    }

    pub fn closest_friendly_nest_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
    ) -> Option<Point> {
        self.closest_nest_from(point, excluding, &self.friendly_nests)
    }

    pub fn closest_enemy_nest_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
    ) -> Option<Point> {
        self.closest_nest_from(point, excluding, &self.enemy_nests)
    }

    fn closest_tile_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
        matches: fn(&Tile) -> bool,
    ) -> Option<&Tile> {
        let tiles = self.tiles_by_position();
        let excluding = self.wrap_all(excluding);
        let found = self.closest_point_from(point, |p| {
            !excluding.contains(&p) && tiles.get(&p).is_some_and(matches)
        })?;
        tiles.get(&found)
    }

    fn closest_nest_from(
        &self,
        point: Point,
        excluding: &HashSet<Point>,
        nests: &[Point],
    ) -> Option<Point> {
        let grid = self.grid();
        let nests: HashSet<Point> = nests.iter().map(|&n| grid.wrap(n)).collect();
        let excluding = self.wrap_all(excluding);
        self.closest_point_from(point, |p| nests.contains(&p) && !excluding.contains(&p))
    }

    fn wrap_all(&self, points: &HashSet<Point>) -> HashSet<Point> {
        let grid = self.grid();
        points.iter().map(|&p| grid.wrap(p)).collect()
    }

    // Nests

    /// Nest positions of both teams, friendly first.
    pub fn nest_positions(&self) -> Vec<Point> {
        self.friendly_nests
            .iter()
            .chain(self.enemy_nests.iter())
            .copied()
            .collect()
    }

    pub fn friendly_nest_positions(&self) -> &[Point] {
        &self.friendly_nests
    }

    pub fn enemy_nest_positions(&self) -> &[Point] {
        &self.enemy_nests
    }

    pub fn friendly_nest_clusters(&self) -> &[NestCluster] {
        self.friendly_clusters
            .get_or_init(|| self.cluster_finder().clusters(&self.friendly_nests))
    }

    pub fn enemy_nest_clusters(&self) -> &[NestCluster] {
        self.enemy_clusters
            .get_or_init(|| self.cluster_finder().clusters(&self.enemy_nests))
    }

    fn cluster_finder(&self) -> ClusterFinder<'_> {
        ClusterFinder::new(self.grid(), &self.nest_positions())
    }

    // Tiles

    /// Every non-wall tile: friendly, then enemy, then neutral.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.friendly_tiles
            .iter()
            .chain(self.enemy_tiles.iter())
            .chain(self.neutral_tiles.iter())
    }

    pub fn friendly_tiles(&self) -> &[Tile] {
        &self.friendly_tiles
    }

    pub fn enemy_tiles(&self) -> &[Tile] {
        &self.enemy_tiles
    }

    pub fn neutral_tiles(&self) -> &[Tile] {
        &self.neutral_tiles
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.tiles_by_position().get(&self.grid().wrap(point))
    }

    pub fn tiles_by_position(&self) -> &HashMap<Point, Tile> {
        self.tile_index
            .get_or_init(|| self.tiles().map(|t| (t.position, *t)).collect())
    }

    /// Tiles orthogonally adjacent to `point`, in direction order. Walls are omitted.
    pub fn tiles_around(&self, point: Point) -> Vec<(Direction, &Tile)> {
        let tiles = self.tiles_by_position();
        self.grid()
            .open_neighbors(point)
            .filter_map(|(d, p)| tiles.get(&p).map(|t| (d, t)))
            .collect()
    }

    pub fn friendly_tiles_around(&self, point: Point) -> Vec<&Tile> {
        self.tiles_around(point)
            .into_iter()
            .map(|(_, t)| t)
            .filter(|t| t.is_friendly())
            .collect()
    }

    pub fn enemy_tiles_around(&self, point: Point) -> Vec<&Tile> {
        self.tiles_around(point)
            .into_iter()
            .map(|(_, t)| t)
            .filter(|t| t.is_enemy())
            .collect()
    }

    // Units

    /// Friendly units, weakest first.
    pub fn friendly_units(&self) -> &[Unit] {
        &self.friendlies
    }

    /// Enemy units, weakest first.
    pub fn enemy_units(&self) -> &[Unit] {
        &self.enemies
    }

    /// Friendly unit by uuid. Track units across turns by uuid and look them up here.
    pub fn unit(&self, uuid: &str) -> Option<&Unit> {
        let index = self.uuid_index.get_or_init(|| {
            self.friendlies
                .iter()
                .enumerate()
                .map(|(i, u)| (u.uuid.clone(), i))
                .collect()
        });
        index.get(uuid).map(|&i| &self.friendlies[i])
    }

    pub fn friendly_at(&self, point: Point) -> Option<&Unit> {
        let point = self.grid().wrap(point);
        self.friendly_index()
            .get(&point)
            .map(|&i| &self.friendlies[i])
    }

    pub fn enemy_at(&self, point: Point) -> Option<&Unit> {
        let point = self.grid().wrap(point);
        self.enemy_index().get(&point).map(|&i| &self.enemies[i])
    }

    fn friendly_index(&self) -> &HashMap<Point, usize> {
        self.friendly_index
            .get_or_init(|| position_index(self.grid(), &self.friendlies))
    }

    fn enemy_index(&self) -> &HashMap<Point, usize> {
        self.enemy_index
            .get_or_init(|| position_index(self.grid(), &self.enemies))
    }

    // Intents

    /// Assigns the unit one step toward `target`.
    ///
    /// The step comes from [`World::next_point_in_shortest_path`], so only walls are routed
    /// around. Returns [`MoveType::Rest`] when there is no step to take.
    pub fn move_unit(&self, uuid: &str, target: Point) -> Result<MoveType, WorldError> {
        let unit = self
            .unit(uuid)
            .ok_or_else(|| WorldError::UnknownUnit(uuid.to_string()))?;

        let position = self.grid().wrap(unit.position);
        let next = self.next_point_in_shortest_path(position, target);
        let kind = if next == position {
            MoveType::Rest
        } else {
            MoveType::Move
        };
        unit.assign(Intent { kind, target: next });
        Ok(kind)
    }

    /// Friendly units that will move this turn.
    pub fn moving_units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.friendlies
            .iter()
            .filter(|u| u.next_move_type() == Some(MoveType::Move))
    }
}

fn position_index(grid: &Grid, units: &[Unit]) -> HashMap<Point, usize> {
    units
        .iter()
        .enumerate()
        .map(|(i, u)| (grid.wrap(u.position), i))
        .collect()
}
