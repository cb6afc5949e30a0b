//! Core battleship game engine (no_std compatible)
//!
//! Boards, fleet placement and the turn engine. Nothing here allocates or
//! touches I/O; all randomness is passed in by the caller.

pub mod bitboard;
pub mod board;
pub mod common;
pub mod config;
pub mod fleet;
pub mod game;
pub mod ship;

// Re-export commonly used types
pub use bitboard::{BitBoard, BitBoardError};
pub use board::{Board, BoardState, LineReport, Snapshot};
pub use common::{AttackOutcome, BoardError, CellState, Coord, Line};
pub use config::*;
pub use fleet::{random_placement, FleetPlan, PlacementProgress};
pub use game::{
    AttackReport, BombingReport, Ending, Game, GameError, GameState, Phase, Side, TurnEvent,
};
pub use ship::{Orientation, Placement};
