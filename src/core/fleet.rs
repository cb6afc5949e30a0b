//! Fleet placement: the ordered ship sequence a side works through, plus
//! randomized placement for automated sides.

use rand::Rng;

use crate::core::board::Board;
use crate::core::common::{BoardError, Coord};
use crate::core::config::{BOARD_SIZE, FLEET, MAX_PLACEMENT_ATTEMPTS};
use crate::core::ship::{Orientation, Placement};

/// Where a side stands after a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum PlacementProgress {
    /// A ship of this length is placed next.
    Next(usize),
    /// Every ship of the fleet is on the board.
    Complete,
}

/// Progress of one side through its fleet. Ships go down in the fixed
/// order of `lengths`; a failed placement leaves the same length pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetPlan {
    lengths: &'static [usize],
    placed: usize,
}

impl FleetPlan {
    pub const fn new(lengths: &'static [usize]) -> Self {
        Self { lengths, placed: 0 }
    }

    /// Plan for the reference fleet.
    pub const fn standard() -> Self {
        Self::new(&FLEET)
    }

    /// Plan with the first `placed` ships already down.
    pub fn resume(lengths: &'static [usize], placed: usize) -> Self {
        Self {
            lengths,
            placed: placed.min(lengths.len()),
        }
    }

    /// Number of ships already placed.
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Length of the ship to place next, if any.
    pub fn next_length(&self) -> Option<usize> {
        self.lengths.get(self.placed).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.placed >= self.lengths.len()
    }

    pub fn progress(&self) -> PlacementProgress {
        match self.next_length() {
            Some(len) => PlacementProgress::Next(len),
            None => PlacementProgress::Complete,
        }
    }

    /// Place the pending ship at `origin`. Advances only on success.
    pub fn place(
        &mut self,
        board: &mut Board,
        origin: Coord,
        orientation: Orientation,
    ) -> Result<PlacementProgress, BoardError> {
        let length = self.next_length().ok_or(BoardError::FleetComplete)?;
        board.place(&Placement::new(origin, orientation, length))?;
        self.placed += 1;
        Ok(self.progress())
    }

    /// Place every remaining ship at random.
    pub fn place_randomly<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        while let Some(length) = self.next_length() {
            let placement = random_placement(board, length, rng)?;
            self.place(board, placement.origin, placement.orientation)?;
        }
        Ok(())
    }
}

impl Default for FleetPlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rejection-sample a uniformly random origin and orientation until the
/// ship fits. Gives up with `UnableToPlaceShip` after
/// `MAX_PLACEMENT_ATTEMPTS` rounds.
pub fn random_placement<R: Rng + ?Sized>(
    board: &Board,
    length: usize,
    rng: &mut R,
) -> Result<Placement, BoardError> {
    Placement::check_length(length)?;
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let origin = Coord::new(
            rng.random_range(0..BOARD_SIZE),
            rng.random_range(0..BOARD_SIZE),
        );
        let orientation = if rng.random_bool(0.5) {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let placement = Placement::new(origin, orientation, length);
        if board.check_placement(&placement).is_ok() {
            return Ok(placement);
        }
    }
    Err(BoardError::UnableToPlaceShip)
}
