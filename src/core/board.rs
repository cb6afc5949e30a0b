//! One side's 10×10 board, stored as ship/hit/miss bitboard layers.

use core::fmt;

use crate::core::bitboard::BitBoard;
use crate::core::common::{AttackOutcome, BoardError, CellState, Coord, Line};
use crate::core::config::BOARD_SIZE;
use crate::core::ship::Placement;

type BB = BitBoard<u128, BOARD_SIZE>;

/// Serializable board state for saving games.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardState {
    pub ships: BB,
    pub hits: BB,
    pub misses: BB,
}

/// Cells newly resolved by a bombing action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LineReport {
    pub hits: usize,
    pub misses: usize,
}

/// Main board state. `hits` is always a subset of `ships` and `misses`
/// never intersects `ships`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    ships: BB,
    hits: BB,
    misses: BB,
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new() -> Self {
        Board {
            ships: BB::new(),
            hits: BB::new(),
            misses: BB::new(),
        }
    }

    /// Validate a placement without touching the board. Returns the mask the
    /// ship would occupy.
    pub fn check_placement(&self, placement: &Placement) -> Result<BB, BoardError> {
        let mask = placement.mask::<u128, BOARD_SIZE>()?;
        if !(self.ships & mask).is_empty() {
            return Err(BoardError::ShipOverlaps);
        }
        Ok(mask)
    }

    /// Place a ship. Every covered cell must be on the board and Empty.
    pub fn place(&mut self, placement: &Placement) -> Result<(), BoardError> {
        let mask = self.check_placement(placement)?;
        self.ships |= mask;
        Ok(())
    }

    /// Resolve an attack at `target`. Hit and Miss cells are rejected so a
    /// hit can never be counted twice.
    pub fn attack(&mut self, target: Coord) -> Result<AttackOutcome, BoardError> {
        let Coord { row, col } = target;
        if self.hits.get(row, col)? || self.misses.get(row, col)? {
            return Err(BoardError::AlreadyTargeted { row, col });
        }
        if self.ships.get(row, col)? {
            self.hits.set(row, col)?;
            Ok(AttackOutcome::Hit)
        } else {
            self.misses.set(row, col)?;
            Ok(AttackOutcome::Miss)
        }
    }

    /// Resolve a whole row or column at once: Ship cells become Hit, Empty
    /// cells become Miss, already resolved cells are left alone and not
    /// counted.
    pub fn bomb(&mut self, line: Line) -> Result<LineReport, BoardError> {
        let mask = match line {
            Line::Row(r) => BB::row(r)?,
            Line::Column(c) => BB::column(c)?,
        };
        let new_hits = mask & self.ships & !self.hits;
        let new_misses = mask & !self.ships & !self.misses;
        self.hits |= new_hits;
        self.misses |= new_misses;
        Ok(LineReport {
            hits: new_hits.count_ones(),
            misses: new_misses.count_ones(),
        })
    }

    pub fn cell(&self, at: Coord) -> Result<CellState, BoardError> {
        let Coord { row, col } = at;
        let state = if self.hits.get(row, col)? {
            CellState::Hit
        } else if self.misses.get(row, col)? {
            CellState::Miss
        } else if self.ships.get(row, col)? {
            CellState::Ship
        } else {
            CellState::Empty
        };
        Ok(state)
    }

    /// `true` once the cell has been resolved to Hit or Miss.
    pub fn is_targeted(&self, at: Coord) -> Result<bool, BoardError> {
        Ok(self.hits.get(at.row, at.col)? || self.misses.get(at.row, at.col)?)
    }

    /// Every cell not yet resolved, row-major.
    pub fn untargeted_cells(&self) -> impl Iterator<Item = Coord> {
        (!(self.hits | self.misses))
            .cells()
            .map(|(row, col)| Coord::new(row, col))
    }

    /// Number of cells ever occupied by ships.
    pub fn ship_cells(&self) -> usize {
        self.ships.count_ones()
    }

    /// Ship cells not yet hit.
    pub fn remaining_ship_cells(&self) -> usize {
        (self.ships & !self.hits).count_ones()
    }

    /// A board with no remaining ship cells is defeated.
    pub fn is_defeated(&self) -> bool {
        self.remaining_ship_cells() == 0
    }

    /// Read-only view of every cell. With `hide_ships`, unhit ship cells
    /// show as Empty.
    pub fn snapshot(&self, hide_ships: bool) -> Snapshot {
        let mut cells = [[CellState::Empty; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in cells.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                let at = Coord::new(r, c);
                *cell = match self.cell(at) {
                    Ok(CellState::Ship) if hide_ships => CellState::Empty,
                    Ok(state) => state,
                    Err(_) => CellState::Empty,
                };
            }
        }
        Snapshot { cells }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{ remaining: {}, hits: {}, misses: {} }}",
            self.remaining_ship_cells(),
            self.hits.count_ones(),
            self.misses.count_ones()
        )?;
        write!(f, "{}", self.snapshot(false))
    }
}

impl From<&Board> for BoardState {
    fn from(b: &Board) -> Self {
        BoardState {
            ships: b.ships,
            hits: b.hits,
            misses: b.misses,
        }
    }
}

impl From<BoardState> for Board {
    fn from(state: BoardState) -> Self {
        Board {
            ships: state.ships,
            hits: state.hits & state.ships,
            misses: state.misses & !state.ships,
        }
    }
}

/// Grid of cell states as shown to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    cells: [[CellState; BOARD_SIZE]; BOARD_SIZE],
}

impl Snapshot {
    pub fn cell(&self, at: Coord) -> Option<CellState> {
        self.cells.get(at.row)?.get(at.col).copied()
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| **c == state)
            .count()
    }
}

/// One line per row, symbols separated by single spaces.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", cell.symbol())?;
            }
            if r + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
