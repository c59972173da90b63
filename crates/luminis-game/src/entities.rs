//! Entity value objects - tiles, units and the intents assigned to them.

use std::cell::Cell;
use std::collections::BTreeSet;

use luminis_nav::Point;
use serde::{Deserialize, Serialize};

/// Ownership of a tile or unit, relative to the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Friendly,
    Enemy,
    Neutral,
}

/// A colour-changing board tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub position: Point,
    pub team: Team,
    /// Permanently owned tiles can no longer change hands.
    pub permanent: bool,
}

impl Tile {
    pub fn new(position: Point, team: Team, permanent: bool) -> Self {
        Self {
            position,
            team,
            permanent,
        }
    }

    pub fn neutral(position: Point) -> Self {
        Self::new(position, Team::Neutral, false)
    }

    pub fn is_friendly(&self) -> bool {
        self.team == Team::Friendly
    }

    pub fn is_enemy(&self) -> bool {
        self.team == Team::Enemy
    }

    pub fn is_neutral(&self) -> bool {
        self.team == Team::Neutral
    }

    pub fn is_permanently_owned(&self) -> bool {
        self.permanent
    }

    /// Not ours and not locked: a friendly unit stepping on it would take it.
    pub fn is_capturable(&self) -> bool {
        !self.is_friendly() && !self.permanent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveType {
    Move,
    Rest,
}

/// Outcome of a unit's previous move, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveResult {
    MoveSuccess,
    DamageSuccess,
    BlockedByWall,
    BlockedByNest,
    NewlySpawned,
    MoveInvalid,
    NewlyMerged,
}

/// What a friendly unit will do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Intent {
    pub kind: MoveType,
    /// The single step the unit takes (its own position when resting).
    pub target: Point,
}

/// A friendly or enemy unit.
///
/// Only friendly units carry an intent. The intent lives in a [`Cell`] so a decision routine
/// can iterate the snapshot's units and assign moves through a shared borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub uuid: String,
    pub team: Team,
    /// Team field exactly as the server sent it; echoed back in responses.
    pub server_team: serde_json::Value,
    pub health: i32,
    pub position: Point,
    pub last_move_result: Option<MoveResult>,
    pub merged_unit_uuids: BTreeSet<String>,
    intent: Cell<Option<Intent>>,
}

impl Unit {
    pub fn new(uuid: impl Into<String>, team: Team, health: i32, position: Point) -> Self {
        Self {
            uuid: uuid.into(),
            team,
            server_team: serde_json::Value::Null,
            health,
            position,
            last_move_result: None,
            merged_unit_uuids: BTreeSet::new(),
            intent: Cell::new(None),
        }
    }

    pub fn with_server_team(mut self, server_team: serde_json::Value) -> Self {
        self.server_team = server_team;
        self
    }

    pub fn with_last_move_result(mut self, result: Option<MoveResult>) -> Self {
        self.last_move_result = result;
        self
    }

    pub fn with_merged_units<I, S>(mut self, uuids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.merged_unit_uuids = uuids.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_friendly(&self) -> bool {
        self.team == Team::Friendly
    }

    /// True if the unit with `uuid` was merged into this one.
    pub fn is_merged_with_unit(&self, uuid: &str) -> bool {
        self.merged_unit_uuids.contains(uuid)
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent.get()
    }

    pub fn next_move_type(&self) -> Option<MoveType> {
        self.intent.get().map(|i| i.kind)
    }

    pub fn next_move_target(&self) -> Option<Point> {
        self.intent.get().map(|i| i.target)
    }

    pub(crate) fn assign(&self, intent: Intent) {
        self.intent.set(Some(intent));
    }
}
