//! Luminis game state.
//!
//! A [`World`] is the immutable-per-turn snapshot a decision routine reads and assigns unit
//! intents through. The [`wire`] module turns server JSON into worlds and intents back into
//! JSON.

#![forbid(unsafe_code)]

pub mod entities;
pub mod wire;
pub mod world;

pub use entities::{Intent, MoveResult, MoveType, Team, Tile, Unit};
pub use wire::{decode_initial_state, decode_turn, InitialState, TurnResponse, WireError};
pub use world::{Board, Holdings, World, WorldError};

pub use luminis_nav::{Direction, Point};
