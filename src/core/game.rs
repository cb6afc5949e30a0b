use core::fmt;

use log::debug;
use rand::Rng;

use crate::core::{
    board::{Board, BoardState, LineReport, Snapshot},
    common::{AttackOutcome, BoardError, Coord, Line},
    config::{BOMBING_THRESHOLD, FLEET},
    fleet::{FleetPlan, PlacementProgress},
    ship::Orientation,
};

/// One of the two sides of a game. Each side owns a board and attacks the
/// opponent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Human,
    Ai,
}

impl Side {
    /// Turn order.
    pub const ALL: [Side; 2] = [Side::Human, Side::Ai];

    pub const fn index(self) -> usize {
        match self {
            Side::Human => 0,
            Side::Ai => 1,
        }
    }

    pub const fn opponent(self) -> Side {
        match self {
            Side::Human => Side::Ai,
            Side::Ai => Side::Human,
        }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Ending {
    FleetDestroyed,
    Forfeit,
}

/// Lifecycle of a game: `Setup → InProgress → GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Setup,
    InProgress,
    GameOver { winner: Side, ending: Ending },
}

/// Something an action triggered beyond its own outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnEvent {
    /// The attacker reached the hit threshold and must bomb (or decline)
    /// before the turn passes.
    BombingUnlocked,
    GameOver { winner: Side },
}

/// Result of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackReport {
    pub side: Side,
    pub target: Coord,
    pub outcome: AttackOutcome,
    /// Attacker's hit counter after the attack.
    pub hit_count: u8,
    pub event: Option<TurnEvent>,
}

/// Result of one bombing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BombingReport {
    pub side: Side,
    pub line: Line,
    /// Ship cells turned into hits.
    pub hits: usize,
    /// Empty cells turned into misses.
    pub misses: usize,
    pub event: Option<TurnEvent>,
}

/// Errors returned by game actions. None of them mutate the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// Placement out of bounds, overlapping, or not wanted any more.
    InvalidPlacement(BoardError),
    /// Target off the board or already resolved. The turn is not consumed.
    InvalidTarget(BoardError),
    NotYourTurn,
    /// Action not allowed in the current phase.
    WrongPhase,
    /// The side has an unlocked bombing to resolve first.
    BombingPending,
    BombingNotUnlocked,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidPlacement(e) => write!(f, "Invalid placement: {}", e),
            GameError::InvalidTarget(e) => write!(f, "Invalid target: {}", e),
            GameError::NotYourTurn => write!(f, "Not your turn"),
            GameError::WrongPhase => write!(f, "Action not allowed in this phase"),
            GameError::BombingPending => write!(f, "Resolve the unlocked bombing first"),
            GameError::BombingNotUnlocked => write!(f, "Bombing is not unlocked"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}

/// Serializable overall game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub boards: [BoardState; 2],
    /// Ships each side has placed so far.
    pub placed: [usize; 2],
    pub hit_counts: [u8; 2],
    pub bombing_unlocked: [bool; 2],
    pub turn: Side,
    pub phase: Phase,
}

/// Authoritative state of one game: both boards, fleet progress, hit
/// counters, bombing flags, the turn pointer and the phase.
#[derive(Debug, Clone)]
pub struct Game {
    boards: [Board; 2],
    fleets: [FleetPlan; 2],
    hit_counts: [u8; 2],
    bombing_unlocked: [bool; 2],
    turn: Side,
    phase: Phase,
}

impl Game {
    /// New game in `Setup` with the reference fleet.
    pub fn new() -> Self {
        Self::with_fleet(&FLEET)
    }

    /// New game in `Setup` where both sides place `lengths`, in order.
    pub fn with_fleet(lengths: &'static [usize]) -> Self {
        Self {
            boards: [Board::new(), Board::new()],
            fleets: [FleetPlan::new(lengths), FleetPlan::new(lengths)],
            hit_counts: [0; 2],
            bombing_unlocked: [false; 2],
            turn: Side::Human,
            phase: Phase::Setup,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Side holding the turn pointer.
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn board(&self, side: Side) -> &Board {
        &self.boards[side.index()]
    }

    pub fn hit_count(&self, side: Side) -> u8 {
        self.hit_counts[side.index()]
    }

    pub fn bombing_unlocked(&self, side: Side) -> bool {
        self.bombing_unlocked[side.index()]
    }

    /// Length of the ship `side` places next, `None` once its fleet is done.
    pub fn next_ship_length(&self, side: Side) -> Option<usize> {
        self.fleets[side.index()].next_length()
    }

    /// `true` once the game is over, or as soon as any board in play has
    /// no ship cells left, whoever holds the turn.
    pub fn is_game_over(&self) -> bool {
        match self.phase {
            Phase::Setup => false,
            Phase::InProgress => self.boards.iter().any(Board::is_defeated),
            Phase::GameOver { .. } => true,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::GameOver { winner, .. } => Some(winner),
            Phase::InProgress => Side::ALL
                .iter()
                .find(|s| self.board(**s).is_defeated())
                .map(|s| s.opponent()),
            Phase::Setup => None,
        }
    }

    /// View of `side`'s board. Ships are hidden when shown to the opponent.
    pub fn snapshot(&self, side: Side, hide_ships: bool) -> Snapshot {
        self.board(side).snapshot(hide_ships)
    }

    /// Place `side`'s next ship. The game starts, Human first, once both
    /// fleets are complete.
    pub fn place_ship(
        &mut self,
        side: Side,
        origin: Coord,
        orientation: Orientation,
    ) -> Result<PlacementProgress, GameError> {
        if self.phase != Phase::Setup {
            return Err(GameError::WrongPhase);
        }
        let i = side.index();
        let progress = self.fleets[i]
            .place(&mut self.boards[i], origin, orientation)
            .map_err(GameError::InvalidPlacement)?;
        self.start_if_ready();
        Ok(progress)
    }

    /// Place all of `side`'s remaining ships at random.
    pub fn place_fleet_randomly<R: Rng + ?Sized>(
        &mut self,
        side: Side,
        rng: &mut R,
    ) -> Result<(), GameError> {
        if self.phase != Phase::Setup {
            return Err(GameError::WrongPhase);
        }
        let i = side.index();
        // Place on a copy so a failure leaves the board untouched.
        let mut board = self.boards[i];
        let mut fleet = self.fleets[i];
        fleet
            .place_randomly(&mut board, rng)
            .map_err(GameError::InvalidPlacement)?;
        self.boards[i] = board;
        self.fleets[i] = fleet;
        self.start_if_ready();
        Ok(())
    }

    fn start_if_ready(&mut self) {
        if self.fleets.iter().all(FleetPlan::is_complete) {
            self.phase = Phase::InProgress;
            self.turn = Side::Human;
            debug!("both fleets placed, game in progress");
        }
    }

    fn check_actor(&self, side: Side) -> Result<(), GameError> {
        if self.phase != Phase::InProgress {
            return Err(GameError::WrongPhase);
        }
        if self.turn != side {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    /// Attack the opponent's board at `target`.
    ///
    /// Invalid or already resolved targets are rejected without consuming
    /// the turn. A hit bumps the attacker's counter; reaching
    /// `BOMBING_THRESHOLD` unlocks a bombing and keeps the turn with the
    /// attacker until it is resolved.
    pub fn attack(&mut self, side: Side, target: Coord) -> Result<AttackReport, GameError> {
        self.check_actor(side)?;
        let i = side.index();
        if self.bombing_unlocked[i] {
            return Err(GameError::BombingPending);
        }

        let opponent = side.opponent();
        let outcome = self.boards[opponent.index()]
            .attack(target)
            .map_err(GameError::InvalidTarget)?;
        if outcome == AttackOutcome::Hit {
            self.hit_counts[i] = self.hit_counts[i].saturating_add(1);
        }

        let event = if let Some(winner) = self.settle(side) {
            Some(TurnEvent::GameOver { winner })
        } else if outcome == AttackOutcome::Hit && self.hit_counts[i] >= BOMBING_THRESHOLD {
            self.bombing_unlocked[i] = true;
            Some(TurnEvent::BombingUnlocked)
        } else {
            self.turn = opponent;
            None
        };
        debug!("{:?} attacked {}: {:?} ({:?})", side, target, outcome, event);

        Ok(AttackReport {
            side,
            target,
            outcome,
            hit_count: self.hit_counts[i],
            event,
        })
    }

    /// Bomb a full row or column of the opponent's board as one action.
    /// Consumes the unlock, resets the hit counter and passes the turn.
    pub fn bomb(&mut self, side: Side, line: Line) -> Result<BombingReport, GameError> {
        self.check_actor(side)?;
        let i = side.index();
        if !self.bombing_unlocked[i] {
            return Err(GameError::BombingNotUnlocked);
        }

        let opponent = side.opponent();
        let LineReport { hits, misses } = self.boards[opponent.index()]
            .bomb(line)
            .map_err(GameError::InvalidTarget)?;
        self.bombing_unlocked[i] = false;
        self.hit_counts[i] = 0;

        let event = match self.settle(side) {
            Some(winner) => Some(TurnEvent::GameOver { winner }),
            None => {
                self.turn = opponent;
                None
            }
        };
        debug!("{:?} bombed {}: {} hit(s), {} miss(es)", side, line, hits, misses);

        Ok(BombingReport {
            side,
            line,
            hits,
            misses,
            event,
        })
    }

    /// Give up an unlocked bombing. The counter still resets.
    pub fn decline_bombing(&mut self, side: Side) -> Result<(), GameError> {
        self.check_actor(side)?;
        let i = side.index();
        if !self.bombing_unlocked[i] {
            return Err(GameError::BombingNotUnlocked);
        }
        self.bombing_unlocked[i] = false;
        self.hit_counts[i] = 0;
        self.turn = side.opponent();
        Ok(())
    }

    /// End the game with `side` conceding. Returns the winner.
    pub fn forfeit(&mut self, side: Side) -> Result<Side, GameError> {
        if let Phase::GameOver { .. } = self.phase {
            return Err(GameError::WrongPhase);
        }
        let winner = side.opponent();
        self.phase = Phase::GameOver {
            winner,
            ending: Ending::Forfeit,
        };
        Ok(winner)
    }

    /// Ends the game if a board was just defeated. The actor's own board is
    /// only checked second, so the acting side wins any tie.
    fn settle(&mut self, actor: Side) -> Option<Side> {
        let winner = if self.board(actor.opponent()).is_defeated() {
            actor
        } else if self.board(actor).is_defeated() {
            actor.opponent()
        } else {
            return None;
        };
        self.phase = Phase::GameOver {
            winner,
            ending: Ending::FleetDestroyed,
        };
        Some(winner)
    }

    /// Generate a serializable snapshot of the current state.
    pub fn state(&self) -> GameState {
        GameState {
            boards: [
                BoardState::from(&self.boards[0]),
                BoardState::from(&self.boards[1]),
            ],
            placed: [self.fleets[0].placed(), self.fleets[1].placed()],
            hit_counts: self.hit_counts,
            bombing_unlocked: self.bombing_unlocked,
            turn: self.turn,
            phase: self.phase,
        }
    }

    /// Restore a game saved with [`Game::state`], using the reference fleet.
    pub fn from_state(state: GameState) -> Self {
        Self::from_state_with_fleet(state, &FLEET)
    }

    /// Restore a game that was created with [`Game::with_fleet`]. A state
    /// only records how many ships were placed, so the same `lengths` must
    /// be passed back.
    pub fn from_state_with_fleet(state: GameState, lengths: &'static [usize]) -> Self {
        Self {
            boards: [Board::from(state.boards[0]), Board::from(state.boards[1])],
            fleets: [
                FleetPlan::resume(lengths, state.placed[0]),
                FleetPlan::resume(lengths, state.placed[1]),
            ],
            hit_counts: state.hit_counts,
            bombing_unlocked: state.bombing_unlocked,
            turn: state.turn,
            phase: state.phase,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
