//! Session registry and turn coordination.
//!
//! Each connected human gets a [`Session`]: one [`Game`] against an
//! automated [`Player`], with its own RNG. The [`Coordinator`] maps session
//! ids to sessions and is the only way in: every read or write of a game
//! happens inside that session's mutex, and the mutex is held only for the
//! in-memory transition, never across I/O.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::core::{
    board::Snapshot,
    common::{Coord, Line},
    fleet::PlacementProgress,
    game::{AttackReport, BombingReport, Game, GameError, GameState, Phase, Side},
    ship::Orientation,
};
use crate::player::{take_automated_turn, AiPlayer, AutomatedTurn, Player};

pub type SessionId = u64;
pub type ConnectionId = u64;

/// Default cap on concurrently open sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// Someone who may act in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    /// A connected client, identified by its connection.
    Human(ConnectionId),
    /// The in-process opponent. It acts inside the human's turn and is never
    /// the current actor from the outside.
    Automated,
}

/// A parsed client command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Place {
        origin: Coord,
        orientation: Orientation,
    },
    Attack(Coord),
    Bomb(Line),
    DeclineBombing,
}

/// What the acting participant's command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Placed(PlacementProgress),
    Attacked(AttackReport),
    Bombed(BombingReport),
    BombingDeclined,
}

/// Result of an accepted [`Coordinator::take_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    pub action: Action,
    /// The opponent's reply, when the command handed it the turn.
    pub automated: Option<AutomatedTurn>,
    /// Phase once everything above is applied.
    pub phase: Phase,
}

/// Consistent read of a session, taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub phase: Phase,
    pub turn: Side,
    /// Next ship the human has to place, during setup.
    pub next_ship_length: Option<usize>,
    /// Human's own board, ships visible.
    pub own_board: Snapshot,
    /// Opponent's board as the human sees it, ships hidden.
    pub enemy_board: Snapshot,
    pub hit_count: u8,
    pub bombing_unlocked: bool,
}

/// Errors returned by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    UnknownSession(SessionId),
    /// The participant is not part of this session.
    NotAParticipant,
    /// Someone else holds the turn. Nothing was changed.
    NotYourTurn,
    /// Already serving the configured maximum of sessions.
    CapacityReached(usize),
    /// A thread panicked while holding a session lock.
    Poisoned,
    Game(GameError),
}

impl From<GameError> for SessionError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::NotYourTurn => SessionError::NotYourTurn,
            other => SessionError::Game(other),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownSession(id) => write!(f, "Unknown session {}", id),
            SessionError::NotAParticipant => write!(f, "Not a participant of this session"),
            SessionError::NotYourTurn => write!(f, "Not your turn"),
            SessionError::CapacityReached(max) => {
                write!(f, "Session capacity reached ({} sessions)", max)
            }
            SessionError::Poisoned => write!(f, "Session lock poisoned"),
            SessionError::Game(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

/// Coordinator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Base seed; session `n` uses `seed + n`. Random when unset.
    pub seed: Option<u64>,
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// One game between a connected human and an automated opponent.
pub struct Session {
    id: SessionId,
    /// Indexed by `Side::index`.
    participants: [Participant; 2],
    game: Game,
    opponent: Box<dyn Player>,
    rng: SmallRng,
}

impl Session {
    fn new(
        id: SessionId,
        owner: ConnectionId,
        mut opponent: Box<dyn Player>,
        mut rng: SmallRng,
    ) -> Result<Self, SessionError> {
        let mut game = Game::new();
        opponent.place_ships(&mut rng, &mut game, Side::Ai)?;
        Ok(Self {
            id,
            participants: [Participant::Human(owner), Participant::Automated],
            game,
            opponent,
            rng,
        })
    }

    fn side_of(&self, participant: Participant) -> Option<Side> {
        Side::ALL
            .iter()
            .copied()
            .find(|side| self.participants[side.index()] == participant)
    }

    /// Participant allowed to act right now, if any. During setup only the
    /// human has anything left to do.
    fn current_actor(&self) -> Option<Participant> {
        match self.game.phase() {
            Phase::Setup => Some(self.participants[Side::Human.index()]),
            Phase::InProgress => Some(self.participants[self.game.turn().index()]),
            Phase::GameOver { .. } => None,
        }
    }

    fn apply(
        &mut self,
        participant: Participant,
        command: Command,
    ) -> Result<TurnOutcome, SessionError> {
        let side = self
            .side_of(participant)
            .ok_or(SessionError::NotAParticipant)?;
        if self.current_actor() != Some(participant) {
            return Err(SessionError::NotYourTurn);
        }

        let action = match command {
            Command::Place {
                origin,
                orientation,
            } => Action::Placed(self.game.place_ship(side, origin, orientation)?),
            Command::Attack(target) => Action::Attacked(self.game.attack(side, target)?),
            Command::Bomb(line) => Action::Bombed(self.game.bomb(side, line)?),
            Command::DeclineBombing => {
                self.game.decline_bombing(side)?;
                Action::BombingDeclined
            }
        };

        let automated = self.play_automated()?;
        debug!("session {}: {:?} then {:?}", self.id, action, automated);
        Ok(TurnOutcome {
            action,
            automated,
            phase: self.game.phase(),
        })
    }

    /// Runs the opponent's turn if the last action handed it the turn.
    fn play_automated(&mut self) -> Result<Option<AutomatedTurn>, SessionError> {
        let ai = Side::Ai;
        if self.game.phase() != Phase::InProgress || self.game.turn() != ai {
            return Ok(None);
        }
        let turn = take_automated_turn(self.opponent.as_mut(), &mut self.game, ai, &mut self.rng)?;
        Ok(Some(turn))
    }

    fn view(&self) -> SessionView {
        let human = Side::Human;
        SessionView {
            phase: self.game.phase(),
            turn: self.game.turn(),
            next_ship_length: self.game.next_ship_length(human),
            own_board: self.game.snapshot(human, false),
            enemy_board: self.game.snapshot(human.opponent(), true),
            hit_count: self.game.hit_count(human),
            bombing_unlocked: self.game.bombing_unlocked(human),
        }
    }
}

/// Registry of live sessions.
pub struct Coordinator {
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<Session>>>>,
    next_id: AtomicU64,
    config: SessionConfig,
}

impl Coordinator {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Open a session for `connection` against the default [`AiPlayer`].
    pub fn open(&self, connection: ConnectionId) -> Result<SessionId, SessionError> {
        self.open_with(connection, Box::new(AiPlayer::new()))
    }

    /// Open a session against `opponent`, which places its fleet right away.
    pub fn open_with(
        &self,
        connection: ConnectionId,
        opponent: Box<dyn Player>,
    ) -> Result<SessionId, SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::Poisoned)?;
        if sessions.len() >= self.config.max_sessions {
            return Err(SessionError::CapacityReached(self.config.max_sessions));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(id)),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let session = Session::new(id, connection, opponent, rng)?;
        sessions.insert(id, Arc::new(Mutex::new(session)));
        info!("session {} opened for connection {}", id, connection);
        Ok(id)
    }

    fn session(&self, id: SessionId) -> Result<Arc<Mutex<Session>>, SessionError> {
        let sessions = self.sessions.lock().map_err(|_| SessionError::Poisoned)?;
        sessions
            .get(&id)
            .cloned()
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Run `f` inside the session's critical section. The registry lock is
    /// released before the session lock is taken.
    fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = self.session(id)?;
        let mut guard = session.lock().map_err(|_| SessionError::Poisoned)?;
        f(&mut guard)
    }

    pub fn current_actor_is(
        &self,
        id: SessionId,
        participant: Participant,
    ) -> Result<bool, SessionError> {
        self.with_session(id, |s| Ok(s.current_actor() == Some(participant)))
    }

    /// Apply `command` for `participant` atomically. Out-of-turn callers get
    /// `NotYourTurn` and nothing changes. If the command passes the turn to
    /// the automated opponent, its turn is played before the lock is
    /// released.
    pub fn take_turn(
        &self,
        id: SessionId,
        participant: Participant,
        command: Command,
    ) -> Result<TurnOutcome, SessionError> {
        self.with_session(id, |s| s.apply(participant, command))
    }

    pub fn view(&self, id: SessionId) -> Result<SessionView, SessionError> {
        self.with_session(id, |s| Ok(s.view()))
    }

    /// Serializable copy of the session's game.
    pub fn export(&self, id: SessionId) -> Result<GameState, SessionError> {
        self.with_session(id, |s| Ok(s.game.state()))
    }

    /// Drop a participant's session after its connection went away. An
    /// unfinished game is forfeited by that participant; the winner is
    /// returned. Finished games return `None`.
    pub fn disconnect(
        &self,
        id: SessionId,
        participant: Participant,
    ) -> Result<Option<Side>, SessionError> {
        let winner = self.with_session(id, |s| {
            let side = s.side_of(participant).ok_or(SessionError::NotAParticipant)?;
            match s.game.phase() {
                Phase::GameOver { .. } => Ok(None),
                _ => Ok(Some(s.game.forfeit(side)?)),
            }
        })?;
        if let Some(winner) = winner {
            info!("session {}: {:?} forfeited, {:?} wins", id, participant, winner);
        }
        self.close(id)?;
        Ok(winner)
    }

    /// Remove a session from the registry.
    pub fn close(&self, id: SessionId) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::Poisoned)?;
        if sessions.remove(&id).is_some() {
            info!("session {} closed", id);
        }
        Ok(())
    }

    /// Number of open sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
