//! The bundled decision routine.

use std::collections::HashSet;

use anyhow::Result;
use luminis_game::{Point, World};

/// Sends every unit toward the nearest tile it could capture, one unit per target.
///
/// Units are visited weakest first, so stronger units get pushed to farther tiles.
#[derive(Debug, Default)]
pub struct CaptureBot {
    turns: u64,
}

impl CaptureBot {
    pub fn decide(&mut self, world: &World) -> Result<()> {
        self.turns += 1;
        let mut claimed: HashSet<Point> = HashSet::new();

        for unit in world.friendly_units() {
            let Some(tile) = world.closest_capturable_tile_from(unit.position, &claimed) else {
                continue;
            };
            claimed.insert(tile.position);
            world.move_unit(&unit.uuid, tile.position)?;
        }

        tracing::debug!(
            turn = self.turns,
            targets = claimed.len(),
            "Assigned capture targets"
        );
        Ok(())
    }
}
