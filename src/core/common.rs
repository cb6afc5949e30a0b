//! Common types: coordinates, cell states, attack outcomes and board errors.

use core::fmt;

use crate::core::bitboard::BitBoardError;

/// A board position, zero-based. Rendered as a row letter and a 1-based
/// column number (`Coord::new(1, 2)` is `B3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

fn row_letter(row: usize) -> char {
    match u8::try_from(row) {
        Ok(r) if r < 26 => char::from(b'A' + r),
        _ => '?',
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", row_letter(self.row), self.col + 1)
    }
}

/// State of a single cell. `Ship` only becomes `Hit` and `Empty` only
/// becomes `Miss`; `Hit` and `Miss` never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    Empty,
    Ship,
    Hit,
    Miss,
}

impl CellState {
    /// Single-character symbol used on the wire.
    pub const fn symbol(self) -> char {
        match self {
            CellState::Empty => '-',
            CellState::Ship => 'S',
            CellState::Hit => 'X',
            CellState::Miss => 'O',
        }
    }
}

/// Result of a single-cell attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    Hit,
    Miss,
}

/// A full row or column, the target of a bombing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Line {
    Row(usize),
    Column(usize),
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Row(r) => write!(f, "row {}", row_letter(*r)),
            Line::Column(c) => write!(f, "column {}", c + 1),
        }
    }
}

/// Errors returned by Board and fleet operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Coordinate or line index lies outside the board.
    InvalidCoordinate { row: usize, col: usize },
    /// Cell was already resolved to Hit or Miss.
    AlreadyTargeted { row: usize, col: usize },
    /// Ship length outside the allowed range.
    InvalidShipLength(usize),
    /// Ship span leaves the board.
    ShipOutOfBounds,
    /// Ship placement overlaps another ship.
    ShipOverlaps,
    /// Every ship of the fleet is already on the board.
    FleetComplete,
    /// Random placement gave up after the attempt cap.
    UnableToPlaceShip,
    /// No cell is left to attack.
    NoTargetsLeft,
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        match err {
            BitBoardError::IndexOutOfBounds { row, col } => {
                BoardError::InvalidCoordinate { row, col }
            }
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidCoordinate { row, col } => {
                write!(f, "Coordinate ({}, {}) is outside the board", row, col)
            }
            BoardError::AlreadyTargeted { row, col } => write!(
                f,
                "{} was already targeted",
                Coord::new(*row, *col)
            ),
            BoardError::InvalidShipLength(len) => write!(f, "Ship length {} is not allowed", len),
            BoardError::ShipOutOfBounds => write!(f, "Ship placement is out of bounds"),
            BoardError::ShipOverlaps => write!(f, "Ship placement overlaps with another ship"),
            BoardError::FleetComplete => write!(f, "All ships are already placed"),
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::NoTargetsLeft => write!(f, "No untargeted cell is left"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
