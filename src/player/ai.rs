use rand::rngs::SmallRng;
use rand::Rng;

use crate::core::{
    board::Board,
    common::{Coord, Line},
    config::BOARD_SIZE,
    game::{Game, GameError, Side},
};

use super::Player;

/// Pseudo-random opponent.
///
/// Targets are drawn uniformly from the cells it has not attacked yet, so
/// it never wastes a turn on an invalid target. When bombing unlocks it
/// always bombs a random row; it never picks a column.
#[derive(Debug, Default)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Player for AiPlayer {
    fn place_ships(
        &mut self,
        rng: &mut SmallRng,
        game: &mut Game,
        side: Side,
    ) -> Result<(), GameError> {
        game.place_fleet_randomly(side, rng)
    }

    fn select_target(&mut self, rng: &mut SmallRng, enemy: &Board) -> Option<Coord> {
        let open = enemy.untargeted_cells().count();
        if open == 0 {
            return None;
        }
        enemy.untargeted_cells().nth(rng.random_range(0..open))
    }

    fn select_bombing_line(&mut self, rng: &mut SmallRng, _enemy: &Board) -> Line {
        Line::Row(rng.random_range(0..BOARD_SIZE))
    }
}
