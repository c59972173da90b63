//! JSON payloads exchanged with the match server.
//!
//! The server sends two kinds of state: the initial board at `GET_READY`, and a per-player state
//! map on every `MOVE`. The client answers each `MOVE` with a [`TurnResponse`].

use std::collections::BTreeMap;

use luminis_nav::{Direction, DirectionOrder, Grid, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{MoveResult, MoveType, Team, Tile, Unit};
use crate::world::{Board, Holdings, World};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("player {0} is missing from the turn state")]
    UnknownPlayer(String),
    #[error("turn state has no opposing player")]
    MissingEnemy,
    #[error("board is empty or ragged")]
    BadBoard,
    #[error("direction order for {uuid} is not a permutation of the four directions: {order:?}")]
    BadDirectionOrder { uuid: String, order: Vec<Direction> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    Wall,
    Tile,
}

/// `GET_READY` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialState {
    /// Column-major: `tiles[x][y]`.
    pub tiles: Vec<Vec<TileKind>>,
    #[serde(default)]
    pub uuid_to_ordered_directions: BTreeMap<String, Vec<Direction>>,
}

impl InitialState {
    /// The wall grid, with `player_uuid`'s neighbour order when the server assigned one.
    pub fn grid_for(&self, player_uuid: &str) -> Result<Grid, WireError> {
        let columns: Vec<Vec<bool>> = self
            .tiles
            .iter()
            .map(|column| column.iter().map(|t| *t == TileKind::Wall).collect())
            .collect();
        let grid = Grid::from_columns(&columns).ok_or(WireError::BadBoard)?;

        let Some(order) = self.uuid_to_ordered_directions.get(player_uuid) else {
            tracing::debug!(player = player_uuid, "No direction order assigned; using N, E, S, W");
            return Ok(grid);
        };
        let bad_order = || WireError::BadDirectionOrder {
            uuid: player_uuid.to_string(),
            order: order.clone(),
        };
        let array: [Direction; 4] = order.as_slice().try_into().map_err(|_| bad_order())?;
        let order = DirectionOrder::new(array).ok_or_else(bad_order)?;
        Ok(grid.with_direction_order(order))
    }
}

/// `MOVE` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnState {
    #[serde(rename = "playerUUIDToPlayerTypeMap")]
    pub players: BTreeMap<String, PlayerState>,
    #[serde(rename = "playerIndexToUUIDMap", default)]
    pub player_index_to_uuid: BTreeMap<String, String>,
}

/// One player's holdings. The server always phrases them from that player's point of view, so
/// the enemy's units arrive under `friendlyUnits` too.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(default)]
    pub friendly_units: Vec<UnitRecord>,
    /// `[x, y, permanent]` with `permanent` as 0 or 1.
    #[serde(default)]
    pub friendly_tile_positions: Vec<(i32, i32, u8)>,
    #[serde(default)]
    pub friendly_nest_positions: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    #[serde(default)]
    pub team: serde_json::Value,
    pub uuid: String,
    #[serde(rename = "LF")]
    pub health: i32,
    pub position: Point,
    #[serde(default)]
    pub last_move_result: Option<MoveResult>,
    #[serde(default)]
    pub merged_unit_uuids: Vec<String>,
}

impl UnitRecord {
    fn into_unit(self, team: Team) -> Unit {
        Unit::new(self.uuid, team, self.health, self.position)
            .with_server_team(self.team)
            .with_last_move_result(self.last_move_result)
            .with_merged_units(self.merged_unit_uuids)
    }
}

impl PlayerState {
    fn split(self, team: Team) -> (Vec<Unit>, Holdings) {
        let units = self
            .friendly_units
            .into_iter()
            .map(|u| u.into_unit(team))
            .collect();
        let tiles = self
            .friendly_tile_positions
            .into_iter()
            .map(|(x, y, permanent)| Tile::new(Point::new(x, y), team, permanent == 1))
            .collect();
        let nests = self
            .friendly_nest_positions
            .into_iter()
            .map(Point::from)
            .collect();
        (units, Holdings { tiles, nests })
    }
}

impl TurnState {
    /// Snapshot from `player_uuid`'s point of view.
    pub fn into_world(mut self, board: &Board, player_uuid: &str) -> Result<World, WireError> {
        let local = self
            .players
            .remove(player_uuid)
            .ok_or_else(|| WireError::UnknownPlayer(player_uuid.to_string()))?;
        let (_, enemy) = self.players.pop_first().ok_or(WireError::MissingEnemy)?;

        let (friendlies, friendly) = local.split(Team::Friendly);
        let (enemies, enemy) = enemy.split(Team::Enemy);
        Ok(World::new(board.clone(), friendlies, enemies, friendly, enemy))
    }
}

pub fn decode_initial_state(payload: &str) -> Result<InitialState, WireError> {
    Ok(serde_json::from_str(payload)?)
}

pub fn decode_turn(payload: &str, board: &Board, player_uuid: &str) -> Result<World, WireError> {
    let state: TurnState = serde_json::from_str(payload)?;
    state.into_world(board, player_uuid)
}

/// Reply to a `MOVE`: every friendly unit that moves this turn. Resting units are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    #[serde(rename = "uuidToCoreMap")]
    pub uuid_to_core_map: BTreeMap<String, CoreRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreRecord {
    pub team: serde_json::Value,
    pub uuid: String,
    #[serde(rename = "LF")]
    pub health: i32,
    pub next_move_type: Option<MoveType>,
    pub next_move_target: Option<Point>,
    pub last_move_result: Option<MoveResult>,
}

impl TurnResponse {
    pub fn from_world(world: &World) -> Self {
        let uuid_to_core_map = world
            .moving_units()
            .map(|unit| {
                let record = CoreRecord {
                    team: unit.server_team.clone(),
                    uuid: unit.uuid.clone(),
                    health: unit.health,
                    next_move_type: unit.next_move_type(),
                    next_move_target: unit.next_move_target(),
                    last_move_result: unit.last_move_result,
                };
                (unit.uuid.clone(), record)
            })
            .collect();
        Self { uuid_to_core_map }
    }

    pub fn len(&self) -> usize {
        self.uuid_to_core_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uuid_to_core_map.is_empty()
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}
