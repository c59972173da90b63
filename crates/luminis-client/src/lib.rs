//! Luminis match-server client.
//!
//! [`Session`] drives the turn protocol over a [`Channel`] of length-prefixed frames and hands
//! each turn's [`World`](luminis_game::World) to a [`DecisionRoutine`] through a
//! [`DeadlineExecutor`], so the server always gets an answer within the configured response
//! time.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod executor;
pub mod framing;
pub mod session;
pub mod signal;

pub use config::{default_player_index, preset_path, ClientConfig, MatchPreset};
pub use error::ClientError;
pub use executor::{DeadlineExecutor, DecisionRoutine, TurnOutcome};
pub use framing::{Channel, MAX_FRAME_LEN};
pub use session::{Phase, Session, SessionSummary};
pub use signal::Signal;
