//! Game rule constants.

/// Boards are `BOARD_SIZE × BOARD_SIZE`.
pub const BOARD_SIZE: usize = 10;

/// Reference fleet: ship lengths in the order they are placed.
pub const FLEET: [usize; 4] = [2, 3, 4, 5];

/// Shortest ship a placement may request.
pub const MIN_SHIP_LENGTH: usize = 2;

/// Longest ship a placement may request.
pub const MAX_SHIP_LENGTH: usize = 5;

/// Cumulative hits that unlock one bombing action.
pub const BOMBING_THRESHOLD: u8 = 3;

/// Upper bound on rejection-sampling rounds for a single random placement.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Total number of ship cells in the reference fleet.
pub const FLEET_CELLS: usize = 2 + 3 + 4 + 5;
