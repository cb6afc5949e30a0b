//! Ship placement requests and their occupancy masks.

use num_traits::{PrimInt, Unsigned};

use crate::core::bitboard::BitBoard;
use crate::core::common::{BoardError, Coord};
use crate::core::config::{MAX_SHIP_LENGTH, MIN_SHIP_LENGTH};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Parse an orientation tag, case-insensitively. Accepts the full words
    /// and the `h`/`v` shorthands.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("horizontal") || tag.eq_ignore_ascii_case("h") {
            Some(Orientation::Horizontal)
        } else if tag.eq_ignore_ascii_case("vertical") || tag.eq_ignore_ascii_case("v") {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }
}

/// Request to put a ship of `length` cells at `origin`, extending right
/// (horizontal) or down (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub origin: Coord,
    pub orientation: Orientation,
    pub length: usize,
}

impl Placement {
    pub const fn new(origin: Coord, orientation: Orientation, length: usize) -> Self {
        Self {
            origin,
            orientation,
            length,
        }
    }

    /// Cells covered by the ship, starting at the origin.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let Placement {
            origin,
            orientation,
            length,
        } = *self;
        (0..length).map(move |i| match orientation {
            Orientation::Horizontal => Coord::new(origin.row, origin.col + i),
            Orientation::Vertical => Coord::new(origin.row + i, origin.col),
        })
    }

    /// Fails unless `length` is a ship length a fleet may contain.
    pub fn check_length(length: usize) -> Result<(), BoardError> {
        if (MIN_SHIP_LENGTH..=MAX_SHIP_LENGTH).contains(&length) {
            Ok(())
        } else {
            Err(BoardError::InvalidShipLength(length))
        }
    }

    /// Occupancy mask on an N×N board. Fails when the length is not allowed
    /// or any covered cell lies off the board.
    pub fn mask<T, const N: usize>(&self) -> Result<BitBoard<T, N>, BoardError>
    where
        T: PrimInt + Unsigned,
    {
        Self::check_length(self.length)?;
        let Coord { row, col } = self.origin;
        if row >= N || col >= N {
            return Err(BoardError::ShipOutOfBounds);
        }
        let fits = match self.orientation {
            Orientation::Horizontal => col + self.length <= N,
            Orientation::Vertical => row + self.length <= N,
        };
        if !fits {
            return Err(BoardError::ShipOutOfBounds);
        }

        let mut mask = BitBoard::<T, N>::new();
        for cell in self.cells() {
            mask.set(cell.row, cell.col)?;
        }
        Ok(mask)
    }
}
