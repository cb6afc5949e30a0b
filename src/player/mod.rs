//! Player trait and the automated opponent.
//!
//! Human players act through the network and the session coordinator; a
//! [`Player`] is a participant with no I/O whose decisions are made here,
//! driven by an injected RNG.

use rand::rngs::SmallRng;

use crate::core::{
    board::Board,
    common::{BoardError, Coord, Line},
    game::{AttackReport, BombingReport, Game, GameError, Side, TurnEvent},
};

/// Interface implemented by automated participants.
pub trait Player: Send {
    /// Place the whole fleet for `side`.
    fn place_ships(&mut self, rng: &mut SmallRng, game: &mut Game, side: Side)
        -> Result<(), GameError>;

    /// Choose the next cell to attack on the opponent's board. `None` when
    /// there is nothing left to target.
    fn select_target(&mut self, rng: &mut SmallRng, enemy: &Board) -> Option<Coord>;

    /// Choose the line to bomb once bombing is unlocked.
    fn select_bombing_line(&mut self, rng: &mut SmallRng, enemy: &Board) -> Line;
}

/// Everything an automated side did during one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct AutomatedTurn {
    pub attack: AttackReport,
    /// Present when the attack unlocked a bombing, which is used at once.
    pub bombing: Option<BombingReport>,
}

/// Play one full turn for `side`: an attack, then the bombing it unlocked
/// if any.
pub fn take_automated_turn(
    player: &mut dyn Player,
    game: &mut Game,
    side: Side,
    rng: &mut SmallRng,
) -> Result<AutomatedTurn, GameError> {
    let enemy = side.opponent();
    let target = player
        .select_target(rng, game.board(enemy))
        .ok_or(GameError::InvalidTarget(BoardError::NoTargetsLeft))?;
    let attack = game.attack(side, target)?;

    let bombing = if attack.event == Some(TurnEvent::BombingUnlocked) {
        let line = player.select_bombing_line(rng, game.board(enemy));
        Some(game.bomb(side, line)?)
    } else {
        None
    };
    Ok(AutomatedTurn { attack, bombing })
}

pub mod ai;
pub use ai::AiPlayer;
